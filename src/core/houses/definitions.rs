use super::models::{House, HouseDefinition};
use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    pub static ref HOUSE_RED: HouseDefinition =
        HouseDefinition::new(House::Red, "Red House", "#E53935");

    pub static ref HOUSE_YELLOW: HouseDefinition =
        HouseDefinition::new(House::Yellow, "Yellow House", "#FDD835");

    pub static ref HOUSE_BLUE: HouseDefinition =
        HouseDefinition::new(House::Blue, "Blue House", "#1E88E5");

    pub static ref HOUSE_PURPLE: HouseDefinition =
        HouseDefinition::new(House::Purple, "Purple House", "#8E24AA");

    pub static ref HOUSES: HashMap<House, &'static HouseDefinition> = {
        let mut map = HashMap::new();
        map.insert(House::Red, &*HOUSE_RED);
        map.insert(House::Yellow, &*HOUSE_YELLOW);
        map.insert(House::Blue, &*HOUSE_BLUE);
        map.insert(House::Purple, &*HOUSE_PURPLE);
        map
    };
}

pub fn get_house_definition(house: House) -> &'static HouseDefinition {
    HOUSES[&house]
}

pub fn all_definitions() -> Vec<&'static HouseDefinition> {
    House::all().into_iter().map(get_house_definition).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_house_has_a_definition() {
        for house in House::all() {
            let def = get_house_definition(house);
            assert_eq!(def.house, house);
            assert!(def.color.starts_with('#'));
            assert!(!def.name.is_empty());
        }
    }

    #[test]
    fn test_definitions_are_distinct() {
        let defs = all_definitions();
        let mut colors: Vec<_> = defs.iter().map(|d| d.color.as_str()).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), House::COUNT);
    }
}
