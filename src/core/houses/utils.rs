use std::collections::HashMap;

use super::definitions::get_house_definition;
use super::models::House;

/// Renders per-house counts as a fixed-width table for the admin CLI.
pub fn format_counts_table(counts: &HashMap<House, u64>) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", "=".repeat(40)));
    output.push_str(&format!("{:<16} {:<10} {:>8}\n", "HOUSE", "COLOR", "COUNT"));
    output.push_str(&format!("{}\n", "-".repeat(40)));

    let mut total = 0u64;
    for house in House::all() {
        let definition = get_house_definition(house);
        let count = counts.get(&house).copied().unwrap_or(0);
        total += count;
        output.push_str(&format!(
            "{:<16} {:<10} {:>8}\n",
            definition.name, definition.color, count
        ));
    }

    output.push_str(&format!("{}\n", "-".repeat(40)));
    output.push_str(&format!("{:<27} {:>8}\n", "TOTAL", total));
    output.push_str(&format!("{}\n", "=".repeat(40)));
    output
}
