//! Terminal output for a resolved location

use base64::{engine::general_purpose, Engine as _};
use wbj_common::config::MapConfig;
use wbj_common::links::{osm_link, static_map_link};
use wbj_common::Candidate;

/// Size of the map image shown in the terminal
pub const CONSOLE_MAP_SIZE: (u32, u32) = (600, 400);

/// Lines printed once the conversation is over
pub fn summary(location: &Candidate, maps: &MapConfig, on_the_road: bool) -> Vec<String> {
    let mut lines = vec![
        location.display_name.clone(),
        osm_link(location),
        static_map_link(location, maps, CONSOLE_MAP_SIZE),
    ];
    if on_the_road {
        lines.push("Goede reis!".to_string());
    }
    lines
}

/// iTerm2 inline image escape sequence
pub fn inline_image(name: &str, image: &[u8]) -> String {
    format!(
        "\x1b]1337;File=name={};size={};inline=1:{}\x07",
        general_purpose::STANDARD.encode(name),
        image.len(),
        general_purpose::STANDARD.encode(image)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station() -> Candidate {
        Candidate::new("7", "Station Zwolle", 52.5055, 6.0914).with_osm("node", "77")
    }

    #[test]
    fn test_summary_here() {
        let lines = summary(&station(), &MapConfig::default(), false);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Station Zwolle");
        assert_eq!(lines[1], "https://www.openstreetmap.org/node/77");
        assert!(lines[2].contains("size=600x400"));
    }

    #[test]
    fn test_summary_on_the_road() {
        let lines = summary(&station(), &MapConfig::default(), true);
        assert_eq!(lines.last().map(String::as_str), Some("Goede reis!"));
    }

    #[test]
    fn test_inline_image() {
        let escape = inline_image("map.png", b"PNG");
        assert!(escape.starts_with("\x1b]1337;File=name=bWFwLnBuZw==;size=3;inline=1:"));
        assert!(escape.ends_with("UE5H\x07"));
    }
}
