/// One boolean amenity flag. The key is the name sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amenity {
    pub key: &'static str,
    pub label: &'static str,
}

/// Every amenity the form offers, in display order. Adding an entry here adds the
/// checkbox, the form state slot and the payload field.
pub static AMENITIES: [Amenity; 10] = [
    Amenity { key: "gym", label: "Gym" },
    Amenity { key: "spa", label: "Spa" },
    Amenity { key: "bar", label: "Bar" },
    Amenity { key: "restaurant", label: "Restaurant" },
    Amenity { key: "laundry", label: "Laundry" },
    Amenity { key: "bikeRental", label: "Bike Rental" },
    Amenity { key: "freeWifi", label: "Free WiFi" },
    Amenity { key: "movieNight", label: "Movie Night" },
    Amenity { key: "swimmingPool", label: "Swimming Pool" },
    Amenity { key: "coffeeShop", label: "Coffee Shop" },
];

/// Checkboxes per grid row.
pub const AMENITIES_PER_ROW: usize = 2;

pub fn list_amenities() -> &'static [Amenity] {
    &AMENITIES
}

pub fn list_amenity_keys() -> Vec<&'static str> {
    AMENITIES.iter().map(|a| a.key).collect()
}

pub fn find_amenity(key: &str) -> Option<&'static Amenity> {
    AMENITIES.iter().find(|a| a.key == key)
}

/// The registry chunked into grid rows; the last row may be short.
pub fn amenity_rows() -> Vec<&'static [Amenity]> {
    AMENITIES.chunks(AMENITIES_PER_ROW).collect()
}
