pub mod asset_loader;
