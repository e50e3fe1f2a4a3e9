//! Header normalization and column resolution.

use crate::SourceError;

/// A listing field backed by a source column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Latitude in degrees.
    Latitude,
    /// Longitude in degrees.
    Longitude,
    /// Asking price.
    Price,
    /// Built area in square meters.
    Area,
    /// Bedroom count.
    Bedrooms,
    /// Bathroom count.
    Bathrooms,
    /// Client / owner name.
    ClientName,
}

impl Field {
    const ALL: &[Self] = &[
        Self::Latitude,
        Self::Longitude,
        Self::Price,
        Self::Area,
        Self::Bedrooms,
        Self::Bathrooms,
        Self::ClientName,
    ];

    /// Canonical column name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::Price => "price",
            Self::Area => "area_m2",
            Self::Bedrooms => "bedrooms",
            Self::Bathrooms => "bathrooms",
            Self::ClientName => "client_name",
        }
    }

    /// Accepted normalized header names, in preference order.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Latitude => &["latitude", "latitud", "lat"],
            Self::Longitude => &["longitude", "longitud", "lon", "lng"],
            Self::Price => &["price", "precio", "valor"],
            Self::Area => &["area_m2", "area", "área", "area m2", "metros"],
            Self::Bedrooms => &["bedrooms", "habitaciones", "alcobas"],
            Self::Bathrooms => &["bathrooms", "banos", "baños"],
            Self::ClientName => &[
                "client_name",
                "cliente",
                "nombre_cliente",
                "propietario",
                "owner",
            ],
        }
    }

    /// Whether a source without this column is structurally invalid.
    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::Latitude | Self::Longitude)
    }
}

/// Trims, lowercases and strips a UTF-8 byte-order mark from a header.
#[must_use]
pub fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Column indexes for each known field; remaining columns are attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub(crate) latitude: usize,
    pub(crate) longitude: usize,
    pub(crate) price: Option<usize>,
    pub(crate) area: Option<usize>,
    pub(crate) bedrooms: Option<usize>,
    pub(crate) bathrooms: Option<usize>,
    pub(crate) client_name: Option<usize>,
    /// `(index, normalized header)` for every column not mapped to a field.
    pub(crate) attributes: Vec<(usize, String)>,
}

impl ColumnMap {
    /// Resolves normalized `headers` against the field aliases.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingColumn`] if no latitude or longitude
    /// column is present.
    pub fn resolve(headers: &[String]) -> Result<Self, SourceError> {
        let find = |field: Field| {
            field
                .aliases()
                .iter()
                .find_map(|alias| headers.iter().position(|h| h.as_str() == *alias))
        };

        let required = |field: Field| {
            find(field).ok_or_else(|| SourceError::MissingColumn {
                column: field.name(),
                accepted: field.aliases().join(", "),
                found: headers.join(", "),
            })
        };
        let latitude = required(Field::Latitude)?;
        let longitude = required(Field::Longitude)?;

        for &field in Field::ALL {
            if !field.is_required() && find(field).is_none() {
                log::warn!(
                    "No '{}' column found (accepted: {}); all values will be missing",
                    field.name(),
                    field.aliases().join(", ")
                );
            }
        }

        let price = find(Field::Price);
        let area = find(Field::Area);
        let bedrooms = find(Field::Bedrooms);
        let bathrooms = find(Field::Bathrooms);
        let client_name = find(Field::ClientName);

        let mapped = [
            Some(latitude),
            Some(longitude),
            price,
            area,
            bedrooms,
            bathrooms,
            client_name,
        ];
        let attributes = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !mapped.contains(&Some(*i)))
            .map(|(i, h)| (i, h.clone()))
            .collect();

        Ok(Self {
            latitude,
            longitude,
            price,
            area,
            bedrooms,
            bathrooms,
            client_name,
            attributes,
        })
    }
}
