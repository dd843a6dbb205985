use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use minijinja::{Environment, Error, State};
use sha2::{Digest, Sha256};

/// Resolves `asset("css/app.css")` in templates to a cache-busting URL
/// such as `/static/css/app.css?v=<sha256>`.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    root: PathBuf,
    cache: Arc<RwLock<HashMap<String, String>>>,
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::with_root("static")
    }
}

impl AssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Arc::default(),
        }
    }

    pub fn asset_path(&self, path: &str) -> String {
        if let Some(hashed_path) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
        {
            return hashed_path.clone();
        }

        let file_path = Path::new(&self.root).join(path);
        match fs::read(file_path) {
            Ok(contents) => {
                let hash = Sha256::digest(contents);
                let hashed_path = format!("/static/{path}?v={hash:x}");
                self.cache
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(path.to_string(), hashed_path.clone());
                hashed_path
            }
            // Not cached, the file may show up later.
            Err(_) => format!("/static/{path}"),
        }
    }

    pub fn register(&self, env: &mut Environment<'_>) {
        let loader = self.clone();
        env.add_function("asset", move |_state: &State, path: String| -> Result<String, Error> {
            Ok(loader.asset_path(&path))
        });
    }
}
