mod definitions;
mod models;
mod utils;

pub use definitions::{
    all_definitions, get_house_definition, HOUSES, HOUSE_BLUE, HOUSE_PURPLE, HOUSE_RED,
    HOUSE_YELLOW,
};
pub use models::{House, HouseDefinition};
pub use utils::format_counts_table;
