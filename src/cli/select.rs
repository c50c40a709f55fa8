//! Interactive selection menus
//!
//! Collects the collections, icons and render options for a run, either from
//! dialoguer prompts or from command-line arguments.

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect};
use iconify_dl::{suggest_collection, Collection, Error, RenderParams};

/// Rows visible at once in the selection menus
const MENU_HEIGHT: usize = 15;

/// A `--collection` argument: `mdi` or `mdi:account,home`
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionArg {
    pub id: String,
    pub icons: Option<Vec<String>>,
}

impl std::str::FromStr for CollectionArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (id, icons) = match s.split_once(':') {
            Some((id, icons)) => {
                let icons: Vec<String> = icons
                    .split(',')
                    .map(str::trim)
                    .filter(|icon| !icon.is_empty())
                    .map(str::to_string)
                    .collect();
                if icons.is_empty() {
                    return Err(format!("no icon names after ':' in '{s}'"));
                }
                (id, Some(icons))
            }
            None => (s, None),
        };

        let id = id.trim();
        if id.is_empty() {
            return Err("collection ID cannot be empty".to_string());
        }

        Ok(Self {
            id: id.to_string(),
            icons,
        })
    }
}

/// Menu label for a collection
pub fn collection_label(collection: &Collection) -> String {
    format!("{} ({})", collection.name, collection.total)
}

/// Match requested IDs against the catalog, suggesting a fix for typos
pub fn resolve_collections<'a>(
    requested: &[CollectionArg],
    collections: &'a [Collection],
) -> iconify_dl::Result<Vec<&'a Collection>> {
    requested
        .iter()
        .map(|arg| {
            collections
                .iter()
                .find(|c| c.id == arg.id)
                .ok_or_else(|| {
                    let hint = suggest_collection(&arg.id, collections.iter().map(|c| c.id.as_str()))
                        .map(|s| format!(" Did you mean '{s}'?"))
                        .unwrap_or_default();
                    Error::InvalidInput(format!("Unknown collection '{}'.{hint}", arg.id))
                })
        })
        .collect()
}

/// Ask which collections to browse
pub fn choose_collections(collections: &[Collection]) -> Result<Vec<&Collection>> {
    let labels: Vec<String> = collections.iter().map(collection_label).collect();

    let picked = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Select icon collections")
        .items(&labels)
        .max_length(MENU_HEIGHT)
        .interact()?;

    Ok(picked.into_iter().map(|i| &collections[i]).collect())
}

/// Ask which icons of one collection to download
pub fn choose_icons(collection: &Collection, icons: &[String]) -> Result<Vec<String>> {
    let picked = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "{} (id: {}, total: {})",
            collection.name, collection.id, collection.total
        ))
        .items(icons)
        .max_length(MENU_HEIGHT)
        .interact()?;

    Ok(picked.into_iter().map(|i| icons[i].clone()).collect())
}

/// Ask for a final go-ahead
pub fn confirm_download(count: usize) -> Result<bool> {
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Are you sure you want to download {count} icons?"))
        .default(false)
        .interact()?;

    Ok(confirmed)
}

/// Ask for the optional width, height and color
pub fn prompt_render_params() -> Result<RenderParams> {
    let theme = ColorfulTheme::default();
    let ask = |title: &str| -> Result<String> {
        let value: String = Input::with_theme(&theme)
            .with_prompt(format!("{title} (optional)"))
            .allow_empty(true)
            .interact_text()?;
        Ok(value)
    };

    let width = ask("Width")?;
    let height = ask("Height")?;
    let color = ask("Color")?;

    Ok(RenderParams::from_input(&width, &height, &color))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Collection> {
        ["mdi", "lucide", "tabler"]
            .iter()
            .map(|id| Collection {
                id: id.to_string(),
                name: id.to_uppercase(),
                total: 100,
                category: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_collection_arg_plain() {
        let arg: CollectionArg = "mdi".parse().unwrap();
        assert_eq!(arg, CollectionArg { id: "mdi".to_string(), icons: None });
    }

    #[test]
    fn test_collection_arg_with_icons() {
        let arg: CollectionArg = "mdi:account, home,,".parse().unwrap();
        assert_eq!(arg.id, "mdi");
        assert_eq!(arg.icons, Some(vec!["account".to_string(), "home".to_string()]));
    }

    #[test]
    fn test_collection_arg_invalid() {
        assert!("".parse::<CollectionArg>().is_err());
        assert!(":home".parse::<CollectionArg>().is_err());
        assert!("mdi:".parse::<CollectionArg>().is_err());
    }

    #[test]
    fn test_collection_label() {
        assert_eq!(collection_label(&catalog()[0]), "MDI (100)");
    }

    #[test]
    fn test_resolve_known_collections() {
        let collections = catalog();
        let requested: Vec<CollectionArg> = vec!["tabler".parse().unwrap(), "mdi:home".parse().unwrap()];

        let resolved = resolve_collections(&requested, &collections).unwrap();
        let ids: Vec<&str> = resolved.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["tabler", "mdi"]);
    }

    #[test]
    fn test_resolve_unknown_collection_suggests() {
        let collections = catalog();
        let requested: Vec<CollectionArg> = vec!["lucid".parse().unwrap()];

        match resolve_collections(&requested, &collections) {
            Err(Error::InvalidInput(msg)) => {
                assert!(msg.contains("Unknown collection 'lucid'"));
                assert!(msg.contains("Did you mean 'lucide'?"));
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }
}
