use anyhow::{anyhow, Result};
use asset_catalog::engine::assets::AssetSlot;
use asset_catalog::{AssetError, Catalog, CatalogConfig, PrepareOptions, Text, Texture};
use log::{info, warn};

const USAGE: &str = "usage: asset-catalog [content-root] <group> [uri...]";

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    // With a single argument the content root comes from the environment
    let (config, group, uris) = match args.as_slice() {
        [] => return Err(anyhow!(USAGE)),
        [group] => (CatalogConfig::from_env(), group, &[][..]),
        [root, group, uris @ ..] => (CatalogConfig::default().with_content_root(root), group, uris),
    };

    let mut catalog = Catalog::new(config).with_builtin_importers()?;
    catalog.prepare(group, &PrepareOptions::default().lazy())?;

    catalog.group(group)?.walk(|node, depth| {
        let pending = node
            .asset_names()
            .into_iter()
            .filter(|name| matches!(node.slot(name), Some(AssetSlot::Lazy(_))))
            .count();
        info!(
            "{:indent$}{} ({} assets, {} lazy)",
            "",
            node.name(),
            node.asset_names().len(),
            pending,
            indent = depth * 2
        );
    });

    for uri in uris {
        match catalog.get::<Texture>(uri) {
            Ok(texture) => info!("{}: texture {}x{}", uri, texture.width(), texture.height()),
            Err(AssetError::TypeMismatch { .. }) => match catalog.get::<Text>(uri) {
                Ok(text) => info!("{}: text, {} lines", uri, text.lines().count()),
                Err(e) => warn!("{}: {}", uri, e),
            },
            Err(e) => warn!("{}: {}", uri, e),
        }
    }

    info!("{:?}", catalog.stats());
    catalog.unload(group, true)?;

    Ok(())
}
