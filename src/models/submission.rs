use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::coordinate::Coordinate;
use crate::models::route::RouteSummary;
use crate::models::warehouse::Warehouse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Donation,
    Request,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Donation => "donation",
            RecordKind::Request => "request",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    Pending,
    Processed,
    #[serde(rename = "Picked Up")]
    PickedUp,
}

impl RecordStatus {
    pub const ALL: [RecordStatus; 3] = [
        RecordStatus::Pending,
        RecordStatus::Processed,
        RecordStatus::PickedUp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "Pending",
            RecordStatus::Processed => "Processed",
            RecordStatus::PickedUp => "Picked Up",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == raw.trim())
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "invalid status '{raw}', expected one of: Pending, Processed, Picked Up"
                ))
            })
    }
}

/// Declares a closed set of labels that travel over the wire as their
/// display text.
macro_rules! label_enum {
    ($name:ident, $field:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn labels() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }

            /// Case-insensitive lookup by label.
            pub fn parse(raw: &str) -> Result<Self, AppError> {
                let wanted = raw.trim().to_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().to_lowercase() == wanted)
                    .ok_or_else(|| {
                        AppError::InvalidInput(format!(
                            "invalid {} '{}', choose one of: {}",
                            $field,
                            raw,
                            Self::labels().join(", ")
                        ))
                    })
            }
        }
    };
}

label_enum!(Category, "category", {
    DryFood => "Thực phẩm khô",
    Fresh => "Tươi sống",
    Canned => "Đồ hộp",
    MilkCold => "Sữa/ Đồ lạnh",
    Spice => "Gia vị",
});

label_enum!(ExpiryWindow, "date", {
    SameDay => "Trong ngày",
    WithinWeek => "Trong tuần",
    WithinMonth => "Trong tháng",
    OverSixMonths => "Trên 6 tháng",
});

label_enum!(StorageMethod, "method", {
    Normal => "Bình thường",
    Chilled => "Cần kho mát",
    Frozen => "Đông lạnh",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationDetails {
    pub category: Category,
    pub date: ExpiryWindow,
    pub method: StorageMethod,
    pub quantity: Option<f64>,
    pub weight: Option<f64>,
    pub exp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDetails {
    pub dry_food_qty: f64,
    pub fresh_food_qty: f64,
    pub canned_food_qty: f64,
    pub milk_cold_qty: f64,
    pub spice_qty: f64,
}

/// Denormalized copy of the warehouse chosen at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedWarehouse {
    pub name: String,
    pub location: Coordinate,
    pub straight_line_km: f64,
}

impl MatchedWarehouse {
    pub fn from_selection(warehouse: &Warehouse, straight_line_km: f64) -> Self {
        Self {
            name: warehouse.name.clone(),
            location: warehouse.location(),
            straight_line_km,
        }
    }
}

/// Everything the pipeline produced, before the store assigns an identity.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission<D> {
    pub submitter_name: String,
    pub submitter_location: Coordinate,
    pub submitter_address: Option<String>,
    pub details: D,
    pub matched_warehouse: MatchedWarehouse,
    pub route: RouteSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord<D> {
    pub id: u64,
    pub submitter_name: String,
    pub submitter_location: Coordinate,
    pub submitter_address: Option<String>,
    pub details: D,
    pub matched_warehouse: MatchedWarehouse,
    pub route: RouteSummary,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
}

pub type DonationRecord = SubmissionRecord<DonationDetails>;
pub type RequestRecord = SubmissionRecord<RequestDetails>;

/// A JSON field that may arrive as a number or as numeric text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    pub fn to_f64(&self, field: &str) -> Result<f64, AppError> {
        match self {
            NumberOrText::Number(value) => Ok(*value),
            NumberOrText::Text(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|_| {
                    AppError::InvalidInput(format!("{field} must be a number, got '{raw}'"))
                }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    Coordinates {
        latitude: NumberOrText,
        longitude: NumberOrText,
    },
    Address(String),
    Missing,
}

impl LocationInput {
    /// Coordinates win when both axes are present; otherwise the address is used.
    pub fn from_fields(
        latitude: Option<NumberOrText>,
        longitude: Option<NumberOrText>,
        address: Option<String>,
    ) -> Self {
        match (latitude, longitude, address) {
            (Some(latitude), Some(longitude), _) => LocationInput::Coordinates {
                latitude,
                longitude,
            },
            (_, _, Some(address)) => LocationInput::Address(address),
            _ => LocationInput::Missing,
        }
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            LocationInput::Address(address) => Some(address.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DonationInput {
    pub user_name: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
    pub method: Option<String>,
    pub quantity: Option<NumberOrText>,
    pub weight: Option<NumberOrText>,
    pub exp: Option<String>,
    pub latitude: Option<NumberOrText>,
    pub longitude: Option<NumberOrText>,
    pub address: Option<String>,
}

impl DonationInput {
    /// Splits the raw payload into submitter name, item details and location,
    /// failing on the first invalid field.
    pub fn validate(self) -> Result<(String, DonationDetails, LocationInput), AppError> {
        let category = Category::parse(&required(self.category, "category")?)?;
        let date = ExpiryWindow::parse(&required(self.date, "date")?)?;
        let method = StorageMethod::parse(&required(self.method, "method")?)?;
        let quantity = optional_non_negative(self.quantity.as_ref(), "quantity")?;
        let weight = optional_non_negative(self.weight.as_ref(), "weight")?;

        let name = self
            .user_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Anonymous".to_string());

        let details = DonationDetails {
            category,
            date,
            method,
            quantity,
            weight,
            exp: self.exp.filter(|exp| !exp.trim().is_empty()),
        };

        let location = LocationInput::from_fields(self.latitude, self.longitude, self.address);
        Ok((name, details, location))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestInput {
    pub requester_name: Option<String>,
    pub dry_food_qty: Option<NumberOrText>,
    pub fresh_food_qty: Option<NumberOrText>,
    pub canned_food_qty: Option<NumberOrText>,
    pub milk_cold_qty: Option<NumberOrText>,
    pub spice_qty: Option<NumberOrText>,
    pub latitude: Option<NumberOrText>,
    pub longitude: Option<NumberOrText>,
    pub address: Option<String>,
}

impl RequestInput {
    pub fn validate(self) -> Result<(String, RequestDetails, LocationInput), AppError> {
        let name = required(self.requester_name, "requester_name")?;

        let quantity = |value: Option<&NumberOrText>, field: &str| {
            optional_non_negative(value, field).map(|qty| qty.unwrap_or(0.0))
        };

        let details = RequestDetails {
            dry_food_qty: quantity(self.dry_food_qty.as_ref(), "dry_food_qty")?,
            fresh_food_qty: quantity(self.fresh_food_qty.as_ref(), "fresh_food_qty")?,
            canned_food_qty: quantity(self.canned_food_qty.as_ref(), "canned_food_qty")?,
            milk_cold_qty: quantity(self.milk_cold_qty.as_ref(), "milk_cold_qty")?,
            spice_qty: quantity(self.spice_qty.as_ref(), "spice_qty")?,
        };

        let location = LocationInput::from_fields(self.latitude, self.longitude, self.address);
        Ok((name, details, location))
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("{field} is required")))
}

fn optional_non_negative(
    value: Option<&NumberOrText>,
    field: &str,
) -> Result<Option<f64>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let parsed = value.to_f64(field)?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(AppError::InvalidInput(format!(
            "{field} must be a non-negative number"
        )));
    }

    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn donation(value: serde_json::Value) -> DonationInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn category_lookup_ignores_case() {
        assert_eq!(Category::parse("tươi sống").unwrap(), Category::Fresh);
        assert_eq!(Category::parse("SỮA/ ĐỒ LẠNH").unwrap(), Category::MilkCold);
        assert!(matches!(
            Category::parse("Clothes"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn status_uses_display_labels_on_the_wire() {
        assert_eq!(
            serde_json::to_value(RecordStatus::PickedUp).unwrap(),
            json!("Picked Up")
        );
        assert_eq!(RecordStatus::parse("Picked Up").unwrap(), RecordStatus::PickedUp);
        assert!(RecordStatus::parse("Lost").is_err());
    }

    #[test]
    fn donation_defaults_to_anonymous_and_prefers_coordinates() {
        let (name, details, location) = donation(json!({
            "category": "Tươi sống",
            "date": "Trong ngày",
            "method": "Bình thường",
            "latitude": "10.0",
            "longitude": 106.0,
            "address": "ignored"
        }))
        .validate()
        .unwrap();

        assert_eq!(name, "Anonymous");
        assert_eq!(details.category, Category::Fresh);
        assert!(matches!(location, LocationInput::Coordinates { .. }));
    }

    #[test]
    fn donation_without_category_is_invalid() {
        let result = donation(json!({
            "date": "Trong ngày",
            "method": "Bình thường",
            "address": "Quận 1"
        }))
        .validate();

        assert!(matches!(result, Err(AppError::InvalidInput(msg)) if msg.contains("category")));
    }

    #[test]
    fn single_axis_falls_back_to_address() {
        let location = LocationInput::from_fields(
            Some(NumberOrText::Number(10.0)),
            None,
            Some("Quận 1".to_string()),
        );
        assert_eq!(location, LocationInput::Address("Quận 1".to_string()));
        assert_eq!(
            LocationInput::from_fields(Some(NumberOrText::Number(10.0)), None, None),
            LocationInput::Missing
        );
    }

    #[test]
    fn request_rejects_negative_quantities() {
        let input: RequestInput = serde_json::from_value(json!({
            "requester_name": "Lan",
            "spice_qty": -1
        }))
        .unwrap();

        assert!(matches!(input.validate(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn request_requires_a_name_and_defaults_quantities() {
        let blank: RequestInput =
            serde_json::from_value(json!({ "requester_name": "   " })).unwrap();
        assert!(blank.validate().is_err());

        let input: RequestInput = serde_json::from_value(json!({
            "requester_name": "Lan",
            "fresh_food_qty": "2.5"
        }))
        .unwrap();
        let (_, details, _) = input.validate().unwrap();
        assert_eq!(details.fresh_food_qty, 2.5);
        assert_eq!(details.dry_food_qty, 0.0);
    }
}
