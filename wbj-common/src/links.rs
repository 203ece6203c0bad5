//! Links to maps for a resolved location

use crate::candidate::Candidate;
use crate::config::MapConfig;

/// OpenStreetMap page of the object behind a candidate
///
/// Falls back to a coordinate link when the OSM reference is unknown.
pub fn osm_link(location: &Candidate) -> String {
    match &location.osm_id {
        Some(osm_id) => {
            let osm_type = match location.osm_type.as_deref() {
                Some("way") | Some("W") => "way",
                Some("relation") | Some("R") => "relation",
                _ => "node",
            };
            format!("https://www.openstreetmap.org/{}/{}", osm_type, osm_id)
        }
        None => format!(
            "https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map=18/{lat}/{lon}",
            lat = location.lat,
            lon = location.lon
        ),
    }
}

/// Static map image centered on the candidate, with a marker
pub fn static_map_link(location: &Candidate, maps: &MapConfig, size: (u32, u32)) -> String {
    format!(
        "{url}?center={lat},{lon}&zoom={zoom}&size={w}x{h}&maptype=mapnik&markers={lat},{lon},{marker}",
        url = maps.static_map_url,
        lat = location.lat,
        lon = location.lon,
        zoom = maps.zoom,
        w = size.0,
        h = size.1,
        marker = maps.marker,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osm_link_by_type() {
        let node = Candidate::new("1", "Station", 53.2106, 6.5641).with_osm("node", "2413845921");
        assert_eq!(osm_link(&node), "https://www.openstreetmap.org/node/2413845921");

        let way = Candidate::new("2", "Vismarkt", 53.2, 6.5).with_osm("way", "123");
        assert_eq!(osm_link(&way), "https://www.openstreetmap.org/way/123");
    }

    #[test]
    fn test_osm_link_without_reference() {
        let bare = Candidate::new("3", "Ergens", 53.5, 6.25);
        assert_eq!(
            osm_link(&bare),
            "https://www.openstreetmap.org/?mlat=53.5&mlon=6.25#map=18/53.5/6.25"
        );
    }

    #[test]
    fn test_static_map_link() {
        let location = Candidate::new("1", "Grote Markt", 53.5, 6.25);
        let link = static_map_link(&location, &MapConfig::default(), (400, 300));
        assert_eq!(
            link,
            "http://staticmap.openstreetmap.de/staticmap.php?center=53.5,6.25&zoom=18&size=400x300&maptype=mapnik&markers=53.5,6.25,lightblue1"
        );
    }
}
