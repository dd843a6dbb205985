use std::f64::consts::PI;

use serde::Serialize;

use crate::{entities::sea_orm_active_enums::Sector, store::Registrant};

/// Chart colours, handed out by a sector's position in the discovered order.
pub const PALETTE: [&str; 6] = [
    "#2563EB", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899",
];

/// Radius of the donut drawn by `stats.html`.
pub const CHART_RADIUS: f64 = 70.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorSlice {
    pub sector: Sector,
    pub label: &'static str,
    pub count: usize,
    pub color: &'static str,
    pub percent: f64,
    /// Stroke length of this slice on the donut circle.
    pub arc_length: f64,
    /// Distance along the circle where this slice starts.
    pub arc_offset: f64,
    /// Rest of the circle after this slice, for `stroke-dasharray`.
    pub dash_gap: f64,
    /// `stroke-dashoffset` that moves the slice to `arc_offset`.
    pub dash_offset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventStats {
    pub total: usize,
    pub distinct_sectors: usize,
    pub circumference: f64,
    pub slices: Vec<SectorSlice>,
}

impl EventStats {
    pub fn from_attendees(attendees: &[Registrant]) -> Self {
        let mut counts: Vec<(Sector, usize)> = Vec::new();
        for attendee in attendees {
            match counts.iter_mut().find(|(sector, _)| *sector == attendee.sector) {
                Some((_, count)) => *count += 1,
                None => counts.push((attendee.sector, 1)),
            }
        }

        let total = attendees.len();
        let circumference = 2.0 * PI * CHART_RADIUS;
        let mut offset = 0.0;
        let slices = counts
            .into_iter()
            .enumerate()
            .map(|(position, (sector, count))| {
                let fraction = count as f64 / total as f64;
                let arc_length = fraction * circumference;
                let slice = SectorSlice {
                    sector,
                    label: sector.label(),
                    count,
                    color: PALETTE[position % PALETTE.len()],
                    percent: (fraction * 1000.0).round() / 10.0,
                    arc_length,
                    arc_offset: offset,
                    dash_gap: circumference - arc_length,
                    dash_offset: -offset,
                };
                offset += arc_length;
                slice
            })
            .collect::<Vec<_>>();

        Self {
            total,
            distinct_sectors: slices.len(),
            circumference,
            slices,
        }
    }

    pub fn count_for(&self, sector: Sector) -> usize {
        self.slices
            .iter()
            .find(|slice| slice.sector == sector)
            .map_or(0, |slice| slice.count)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn attendee(sector: Sector) -> Registrant {
        Registrant {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            id_number: "1".into(),
            phone: "300".into(),
            sector,
            photo_url: None,
            registered_at: Utc::now(),
            event_id: Some(Uuid::nil()),
        }
    }

    #[test]
    fn counts_sectors_in_discovered_order() {
        let attendees = [
            attendee(Sector::Samaria),
            attendee(Sector::Samaria),
            attendee(Sector::ZonaUrbana),
        ];
        let stats = EventStats::from_attendees(&attendees);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.distinct_sectors, 2);
        assert_eq!(stats.count_for(Sector::Samaria), 2);
        assert_eq!(stats.count_for(Sector::ZonaUrbana), 1);
        assert_eq!(stats.count_for(Sector::ElVerso), 0);

        let labels: Vec<&str> = stats.slices.iter().map(|s| s.label).collect();
        assert_eq!(labels, ["Samaria", "Zona Urbana"]);
        assert_eq!(stats.slices[0].color, PALETTE[0]);
        assert_eq!(stats.slices[1].color, PALETTE[1]);
        assert_eq!(stats.slices[0].percent, 66.7);
    }

    #[test]
    fn slices_cover_the_whole_circle() {
        let attendees = [
            attendee(Sector::LaPaila),
            attendee(Sector::Morritos),
            attendee(Sector::LaPaila),
            attendee(Sector::ElPintado),
        ];
        let stats = EventStats::from_attendees(&attendees);
        let last = stats.slices.last().unwrap();
        assert!((last.arc_offset + last.arc_length - stats.circumference).abs() < 1e-9);
        assert_eq!(stats.slices[1].arc_offset, stats.slices[0].arc_length);
        assert_eq!(stats.slices[1].dash_offset, -stats.slices[1].arc_offset);
        assert_eq!(stats.slices[0].dash_offset, 0.0);
    }

    #[test]
    fn chart_template_renders_slices() {
        let mut env = minijinja::Environment::new();
        env.add_template(
            "chart",
            "{% for slice in stats.slices %}{{ slice.arc_length }} {{ slice.dash_gap }} \
             {{ slice.dash_offset }};{% endfor %}",
        )
        .unwrap();
        let attendees = [
            attendee(Sector::Samaria),
            attendee(Sector::Samaria),
            attendee(Sector::LaPaila),
        ];
        let stats = EventStats::from_attendees(&attendees);
        let out = env
            .get_template("chart")
            .unwrap()
            .render(minijinja::context! { stats => stats })
            .unwrap();
        assert_eq!(out.matches(';').count(), 2);
        assert!(out.contains('-'));
    }

    #[test]
    fn palette_wraps_after_six_sectors() {
        let sectors = [
            Sector::ZonaUrbana,
            Sector::Filadelfia,
            Sector::Samaria,
            Sector::SanLuis,
            Sector::Morritos,
            Sector::LaPaila,
            Sector::ElPintado,
        ];
        let attendees: Vec<Registrant> = sectors.into_iter().map(attendee).collect();
        let stats = EventStats::from_attendees(&attendees);
        assert_eq!(stats.slices[6].color, PALETTE[0]);
    }

    #[test]
    fn no_attendees_means_no_slices() {
        let stats = EventStats::from_attendees(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.distinct_sectors, 0);
        assert!(stats.slices.is_empty());
    }
}
