use serde::{Deserialize, Serialize};

pub const VAT_RATE: f64 = 0.10;
pub const AIT_RATE: f64 = 0.05;

pub const FORMAT_LOCAL: &str = "local";
pub const FORMAT_FOREIGN: &str = "foreign";

/// Costing mode of a product or BOQ line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductFormat {
    #[default]
    Local,
    Foreign,
}

impl ProductFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductFormat::Local => FORMAT_LOCAL,
            ProductFormat::Foreign => FORMAT_FOREIGN,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            FORMAT_LOCAL => Some(ProductFormat::Local),
            FORMAT_FOREIGN => Some(ProductFormat::Foreign),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CostInput {
    pub format: ProductFormat,
    pub unit_price: f64,
    pub margin_pct: f64,
    pub quantity: i64,
    pub ex_works: f64,
    pub cnf: f64,
    pub shipping: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CostBreakdown {
    pub format: ProductFormat,
    pub unit_price: f64,
    pub margin_pct: f64,
    pub margin_value: f64,
    pub vat: f64,
    pub ait: f64,
    pub ex_works: f64,
    pub cnf: f64,
    pub shipping: f64,
    pub total_unit_price: f64,
    pub quantity: i64,
    pub total_price: f64,
}

/// Per-unit and line cost.
///
/// Local lines pay VAT and AIT on the base price; foreign lines replace the
/// base price with import costs and pay no domestic tax. The margin is always
/// a percentage of the base unit price.
pub fn calculate_line_cost(input: &CostInput) -> CostBreakdown {
    let margin_value = input.unit_price * (input.margin_pct / 100.0);
    let (vat, ait, ex_works, cnf, shipping, total_unit_price) = match input.format {
        ProductFormat::Local => {
            let vat = input.unit_price * VAT_RATE;
            let ait = input.unit_price * AIT_RATE;
            (
                vat,
                ait,
                0.0,
                0.0,
                0.0,
                input.unit_price + margin_value + vat + ait,
            )
        }
        ProductFormat::Foreign => (
            0.0,
            0.0,
            input.ex_works,
            input.cnf,
            input.shipping,
            input.ex_works + input.cnf + input.shipping + margin_value,
        ),
    };
    CostBreakdown {
        format: input.format,
        unit_price: input.unit_price,
        margin_pct: input.margin_pct,
        margin_value,
        vat,
        ait,
        ex_works,
        cnf,
        shipping,
        total_unit_price,
        quantity: input.quantity,
        total_price: total_unit_price * input.quantity as f64,
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CostSummary {
    pub total_local: f64,
    pub total_foreign: f64,
    pub total_vat: f64,
    pub total_ait: f64,
    pub total_ex_works: f64,
    pub total_cnf: f64,
    pub total_shipping: f64,
    pub grand_total: f64,
}

pub fn summarize<'a, I: IntoIterator<Item = &'a CostBreakdown>>(lines: I) -> CostSummary {
    let mut summary = CostSummary::default();
    for line in lines {
        match line.format {
            ProductFormat::Local => summary.total_local += line.total_price,
            ProductFormat::Foreign => summary.total_foreign += line.total_price,
        }
        let quantity = line.quantity as f64;
        summary.total_vat += line.vat * quantity;
        summary.total_ait += line.ait * quantity;
        summary.total_ex_works += line.ex_works * quantity;
        summary.total_cnf += line.cnf * quantity;
        summary.total_shipping += line.shipping * quantity;
        summary.grand_total += line.total_price;
    }
    summary
}
