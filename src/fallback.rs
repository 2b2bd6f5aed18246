//! Deterministic synthetic data for unconfigured or failing providers.
//!
//! Everything here is pure and network-free: the same inputs always produce
//! the same output, so a degraded response stays stable across calls within
//! a process. Ratings and prices derive from an FNV-1a hash of the name.

use crate::models::{Hotel, ImageRef, PointOfInterest, RouteSummary, WeatherSnapshot};

/// FNV-1a over the name's bytes. Stable across platforms and process runs.
#[must_use]
pub fn fnv1a(name: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET_BASIS;
    for byte in name.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Synthetic rating in [4.0, 4.9], stable for the same name
#[must_use]
pub fn hotel_rating(name: &str) -> String {
    let rating = 4.0 + (fnv1a(name) % 10) as f64 / 10.0;
    format!("{rating:.1}")
}

/// Synthetic nightly price in the ₹1,500–₹3,400 band, stable for the same name
#[must_use]
pub fn hotel_price(name: &str) -> String {
    let price = 1500 + (fnv1a(name) % 20) * 100;
    format!("₹{},{:03}", price / 1000, price % 1000)
}

/// Placeholder image URL parameterized by the name so it stays stable
#[must_use]
pub fn hotel_image(name: &str) -> String {
    format!("https://picsum.photos/400/300?random={}", fnv1a(name) % 1000)
}

/// Synthetic hotels interpolating the place name
#[must_use]
pub fn hotels(place: &str, limit: usize) -> Vec<Hotel> {
    let names = [
        format!("Grand {place} Hotel"),
        format!("{place} Plaza Resort"),
        format!("Serenity {place} Inn"),
        format!("{place} Heritage Stay"),
        format!("Royal {place} Suites"),
    ];

    names
        .into_iter()
        .take(limit)
        .map(|name| {
            let price_display = hotel_price(&name);
            let rating_display = hotel_rating(&name);
            let image_url = hotel_image(&name);
            Hotel {
                name,
                address: None,
                coordinate: None,
                price_display,
                rating_display,
                image_url,
            }
        })
        .collect()
}

/// One fixed plausible snapshot
#[must_use]
pub fn weather() -> WeatherSnapshot {
    WeatherSnapshot {
        temperature: "25°C".to_string(),
        condition: "Partly Cloudy".to_string(),
        humidity: "60%".to_string(),
        wind_speed: "10 km/h".to_string(),
        icon: String::new(),
    }
}

/// One fixed plausible route summary
#[must_use]
pub fn route() -> RouteSummary {
    RouteSummary {
        distance: "~150 km".to_string(),
        duration: "~3 hours".to_string(),
        mode: "Car".to_string(),
    }
}

/// Placeholder images parameterized only by index, so repeated calls with the
/// same limit are stable
#[must_use]
pub fn images(limit: usize) -> Vec<ImageRef> {
    (0..limit)
        .map(|i| ImageRef::new(format!("https://picsum.photos/800/600?random={i}")))
        .collect()
}

/// Synthetic attractions interpolating the place name
#[must_use]
pub fn attractions(place: &str) -> Vec<PointOfInterest> {
    let spots = [
        (
            format!("{place} City Center"),
            "The heart of the city with vibrant markets and historic buildings.",
        ),
        (
            format!("{place} Heritage Site"),
            "A significant historical landmark showcasing local culture.",
        ),
        (
            format!("{place} Natural Park"),
            "Beautiful natural surroundings perfect for relaxation and photography.",
        ),
        (
            format!("{place} Museum"),
            "Explore the rich history and culture of the region.",
        ),
        (
            format!("{place} Viewpoint"),
            "Stunning panoramic views of the city and surrounding areas.",
        ),
    ];

    spots
        .into_iter()
        .map(|(name, blurb)| PointOfInterest {
            name,
            category: "attraction".to_string(),
            address: None,
            coordinate: None,
            distance_meters: None,
            description: Some(blurb.to_string()),
        })
        .collect()
}

/// Default description when no summary provider result is available
#[must_use]
pub fn description(place: &str) -> String {
    format!("{place} is a beautiful destination worth exploring.")
}

/// Generic facts used to top the fact list up to its fixed count
#[must_use]
pub fn generic_facts(place: &str) -> Vec<String> {
    vec![
        format!("{place} is a beautiful destination with rich culture and history."),
        format!("Best time to visit {place} is during pleasant weather seasons."),
        format!("{place} offers a variety of attractions for all types of travelers."),
        format!("Local cuisine in {place} is known for its unique flavors."),
        format!("{place} has a vibrant local community and welcoming atmosphere."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_is_stable() {
        assert_eq!(fnv1a("Paris"), fnv1a("Paris"));
        assert_ne!(fnv1a("Paris"), fnv1a("London"));
        // Known FNV-1a vector
        assert_eq!(fnv1a(""), 0xcbf2_9ce4_8422_2325);
    }

    #[test]
    fn test_rating_stays_in_band() {
        for name in ["Grand Paris Hotel", "Royal Tokyo Suites", "x"] {
            let rating: f64 = hotel_rating(name).parse().unwrap();
            assert!((4.0..=4.9).contains(&rating), "rating {rating} out of band");
        }
    }

    #[test]
    fn test_price_stays_in_band() {
        for name in ["Grand Paris Hotel", "Royal Tokyo Suites", "x"] {
            let price = hotel_price(name);
            let numeric: u64 = price
                .trim_start_matches('₹')
                .replace(',', "")
                .parse()
                .unwrap();
            assert!((1500..=3400).contains(&numeric), "price {numeric} out of band");
            assert!(price.starts_with('₹'));
        }
    }

    #[test]
    fn test_hotels_are_deterministic() {
        let first = hotels("Paris", 5);
        let second = hotels("Paris", 5);
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
        assert!(first.iter().all(|h| h.name.contains("Paris")));
    }

    #[test]
    fn test_hotels_respect_limit() {
        assert_eq!(hotels("Paris", 2).len(), 2);
    }

    #[test]
    fn test_images_are_index_parameterized() {
        let images = images(3);
        assert_eq!(images.len(), 3);
        assert!(images[0].url.ends_with("random=0"));
        assert!(images[2].url.ends_with("random=2"));
    }

    #[test]
    fn test_attractions_interpolate_place() {
        let attractions = attractions("Kyoto");
        assert_eq!(attractions.len(), 5);
        assert!(attractions.iter().all(|a| a.name.contains("Kyoto")));
        assert!(attractions.iter().all(|a| a.category == "attraction"));
    }

    #[test]
    fn test_weather_snapshot_shape() {
        let snapshot = weather();
        assert_eq!(snapshot.condition, "Partly Cloudy");
        assert_eq!(snapshot.temperature, "25°C");
    }
}
