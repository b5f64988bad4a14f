//! Static pricing catalog: service and add-on keys mapped to prices and
//! display names. Read-only; the admin dashboard uses it to estimate
//! booking values, the booking form to show a running total.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEntry {
    pub price: u32,
    pub display_name: String,
}

#[derive(Debug, Clone)]
pub struct PriceBook {
    services: HashMap<String, PriceEntry>,
    addons: HashMap<String, PriceEntry>,
}

impl PriceBook {
    /// The business's standard catalog.
    pub fn standard() -> Self {
        let services = [
            ("premium-exterior", 50, "Premium Exterior"),
            ("interior-detail", 150, "Interior Detail"),
            ("sedan-full", 200, "Sedan Full Detail"),
            ("mid-size-suv-full", 225, "Mid-Size SUV Full"),
            ("truck-full", 250, "Truck Full Detail"),
            ("suv-full", 275, "SUV Full Detail"),
            ("custom", 200, "Custom Package"),
            ("quote", 0, "Custom Quote"),
        ];
        let addons = [
            ("ceramic-coat", 25, "Ceramic Coat Sealant"),
            ("clay-bar", 50, "Clay Bar"),
            ("headlight-restoration", 50, "Headlight Restoration"),
            ("carpet-shampoo", 50, "Full Carpet Shampoo"),
            ("seat-shampoo", 50, "Full Seat Shampoo"),
            ("pet-hair-removal", 50, "Excessive Pet Hair Removal"),
            ("stain-removal", 50, "Excessive Stain Removal"),
        ];

        fn build(entries: &[(&str, u32, &str)]) -> HashMap<String, PriceEntry> {
            entries
                .iter()
                .map(|(key, price, name)| {
                    (
                        key.to_string(),
                        PriceEntry {
                            price: *price,
                            display_name: name.to_string(),
                        },
                    )
                })
                .collect()
        }

        Self {
            services: build(&services),
            addons: build(&addons),
        }
    }

    /// Unknown keys price at zero rather than failing; legacy records may
    /// carry retired service keys.
    pub fn service_price(&self, key: &str) -> u32 {
        self.services.get(key).map(|e| e.price).unwrap_or(0)
    }

    pub fn addon_price(&self, key: &str) -> u32 {
        self.addons.get(key).map(|e| e.price).unwrap_or(0)
    }

    pub fn service_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.services
            .get(key)
            .map(|e| e.display_name.as_str())
            .unwrap_or(key)
    }

    pub fn addon_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.addons
            .get(key)
            .map(|e| e.display_name.as_str())
            .unwrap_or(key)
    }

    /// Estimated value of a booking: main service plus add-ons.
    pub fn booking_value(&self, service: &str, addons: &[String]) -> u32 {
        self.service_price(service)
            + addons
                .iter()
                .map(|addon| self.addon_price(addon.trim()))
                .sum::<u32>()
    }

    pub fn service_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.services.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn addon_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.addons.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for PriceBook {
    fn default() -> Self {
        Self::standard()
    }
}
