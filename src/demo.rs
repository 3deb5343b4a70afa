//! Demo Data
//!
//! Sample taxonomy for `?demo` mode.

use options_core::{InMemoryOptionsRepository, OptionItem, OptionMetadata, OptionPayload, OptionType};

fn add(
    repo: &InMemoryOptionsRepository,
    option_type: OptionType,
    label: &str,
    parent: Option<&OptionItem>,
) -> Option<OptionItem> {
    let payload = OptionPayload::new(option_type, label)
        .ok()?
        .with_parent(parent.map(|p| p.id.clone()));
    Some(repo.seed(payload))
}

fn add_city(repo: &InMemoryOptionsRepository, label: &str, link: &str) -> Option<OptionItem> {
    let metadata = OptionMetadata::new().with_whatsapp_link(Some(link.to_string()));
    let payload = OptionPayload::new(OptionType::City, label)
        .ok()?
        .with_metadata(metadata);
    Some(repo.seed(payload))
}

fn add_areas(repo: &InMemoryOptionsRepository, city: &OptionItem, areas: &[&str]) {
    let area_type = OptionType::scope_key(&city.value);
    for area in areas {
        add(repo, area_type.clone(), area, Some(city));
    }
}

pub fn seed(repo: &InMemoryOptionsRepository) {
    let boards: Vec<OptionItem> = ["CBSE", "ICSE"]
        .into_iter()
        .filter_map(|b| add(repo, OptionType::Board, b, None))
        .collect();
    for board in boards {
        for grade in ["Class 9", "Class 10"] {
            let Some(grade) = add(repo, OptionType::Grade, grade, Some(&board)) else {
                continue;
            };
            for subject in ["Mathematics", "Science"] {
                if let Some(subject) = add(repo, OptionType::Subject, subject, Some(&grade)) {
                    add(repo, OptionType::Chapter, "Chapter 1", Some(&subject));
                }
            }
        }
    }

    if let Some(bhopal) = add_city(repo, "Bhopal", "https://chat.whatsapp.com/BhopalTutors") {
        add_areas(repo, &bhopal, &["MP Nagar", "Arera Colony", "Kolar Road"]);
    }
    if let Some(indore) = add_city(repo, "Indore", "https://wa.me/919800000000") {
        add_areas(repo, &indore, &["Vijay Nagar", "Palasia"]);
    }

    let language = OptionType::Custom("LANGUAGE".to_string());
    for label in ["English", "Hindi"] {
        add(repo, language.clone(), label, None);
    }
    log::debug!("[DEMO] seeded {} options", repo.items().len());
}

