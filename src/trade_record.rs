use crate::{
    error::LoadError,
    spreadsheet::{Cell, normalize_header},
};

/// `trade_records` columns in insert order. Spreadsheet headers are matched
/// against these after [`normalize_header`].
pub const TRADE_COLUMNS: [&str; 25] = [
    "NO",
    "ARRIVAL_DATE",
    "HS_CODE",
    "HS_CODE_DESCRIPTION",
    "IMPORTER_ADDRESS",
    "IMPORTER_COUNTRY",
    "TEL",
    "EMAIL",
    "WEB",
    "EXPORTER_ADDRESS",
    "COUNTRY_OF_ORIGIN",
    "IMPORT_VALUE",
    "CURRENCY",
    "NET_WEIGHT",
    "NET_WEIGHT_UNIT",
    "GROSS_WEIGHT",
    "GROSS_WEIGHT_UNIT",
    "QUANTITY",
    "QUANTITY_UNIT",
    "PRODUCT_DETAILS",
    "NUMBER_OF_PACKAGES",
    "PACKAGES_UNIT",
    "PLACE_OF_DELIVERY",
    "MANUFACTURING_COMPANY",
    "VOLUME",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRecord {
    pub no: Cell,
    pub arrival_date: Cell,
    pub hs_code: Cell,
    pub hs_code_description: Cell,
    pub importer_address: Cell,
    pub importer_country: Cell,
    pub tel: Cell,
    pub email: Cell,
    pub web: Cell,
    pub exporter_address: Cell,
    pub country_of_origin: Cell,
    pub import_value: Cell,
    pub currency: Cell,
    pub net_weight: Cell,
    pub net_weight_unit: Cell,
    pub gross_weight: Cell,
    pub gross_weight_unit: Cell,
    pub quantity: Cell,
    pub quantity_unit: Cell,
    pub product_details: Cell,
    pub number_of_packages: Cell,
    pub packages_unit: Cell,
    pub place_of_delivery: Cell,
    pub manufacturing_company: Cell,
    pub volume: Cell,
}

impl TradeRecord {
    /// Field values in [`TRADE_COLUMNS`] order.
    pub fn values(&self) -> [&Cell; 25] {
        [
            &self.no,
            &self.arrival_date,
            &self.hs_code,
            &self.hs_code_description,
            &self.importer_address,
            &self.importer_country,
            &self.tel,
            &self.email,
            &self.web,
            &self.exporter_address,
            &self.country_of_origin,
            &self.import_value,
            &self.currency,
            &self.net_weight,
            &self.net_weight_unit,
            &self.gross_weight,
            &self.gross_weight_unit,
            &self.quantity,
            &self.quantity_unit,
            &self.product_details,
            &self.number_of_packages,
            &self.packages_unit,
            &self.place_of_delivery,
            &self.manufacturing_company,
            &self.volume,
        ]
    }
}

/// Which spreadsheet column feeds each [`TradeRecord`] field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    indices: [usize; 25],
}

impl ColumnMapping {
    /// Every column in [`TRADE_COLUMNS`] must be present; extra spreadsheet
    /// columns are ignored and their order does not matter.
    pub fn resolve(headers: &[String]) -> Result<Self, LoadError> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let mut indices = [0; 25];
        for (slot, column) in indices.iter_mut().zip(TRADE_COLUMNS) {
            *slot = normalized
                .iter()
                .position(|header| header == column)
                .ok_or_else(|| LoadError::MissingColumn(column.to_string()))?;
        }
        Ok(Self { indices })
    }

    pub fn record(&self, row: &[Cell]) -> TradeRecord {
        let [
            no,
            arrival_date,
            hs_code,
            hs_code_description,
            importer_address,
            importer_country,
            tel,
            email,
            web,
            exporter_address,
            country_of_origin,
            import_value,
            currency,
            net_weight,
            net_weight_unit,
            gross_weight,
            gross_weight_unit,
            quantity,
            quantity_unit,
            product_details,
            number_of_packages,
            packages_unit,
            place_of_delivery,
            manufacturing_company,
            volume,
        ] = self
            .indices
            .map(|i| row.get(i).cloned().unwrap_or(Cell::Empty));

        TradeRecord {
            no,
            arrival_date,
            hs_code,
            hs_code_description,
            importer_address,
            importer_country,
            tel,
            email,
            web,
            exporter_address,
            country_of_origin,
            import_value,
            currency,
            net_weight,
            net_weight_unit,
            gross_weight,
            gross_weight_unit,
            quantity,
            quantity_unit,
            product_details,
            number_of_packages,
            packages_unit,
            place_of_delivery,
            manufacturing_company,
            volume,
        }
    }
}
