//! Built-in registry used when no `config.toml` overrides `[[stocks]]` / `[[indices]]`.

use crate::settings::IndexDefinition;
use core_types::StockMetadata;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// (symbol, name, sector, base price, volatility, baseline volume)
const NSE_LARGE_CAPS: &[(&str, &str, &str, Decimal, f64, u64)] = &[
    ("RELIANCE", "Reliance Industries", "Energy", dec!(2650.50), 0.02, 6_500_000),
    ("TCS", "Tata Consultancy Services", "IT", dec!(3850.75), 0.015, 2_100_000),
    ("INFY", "Infosys", "IT", dec!(1580.30), 0.018, 6_800_000),
    ("HDFCBANK", "HDFC Bank", "Banking", dec!(1685.90), 0.02, 12_000_000),
    ("ICICIBANK", "ICICI Bank", "Banking", dec!(1150.40), 0.022, 14_500_000),
    ("HINDUNILVR", "Hindustan Unilever", "FMCG", dec!(2420.60), 0.012, 1_400_000),
    ("ITC", "ITC", "FMCG", dec!(465.80), 0.015, 11_000_000),
    ("SBIN", "State Bank of India", "Banking", dec!(785.50), 0.025, 16_000_000),
    ("BHARTIARTL", "Bharti Airtel", "Telecom", dec!(1545.20), 0.018, 5_500_000),
    ("KOTAKBANK", "Kotak Mahindra Bank", "Banking", dec!(1775.30), 0.02, 4_200_000),
    ("LT", "Larsen & Toubro", "Infrastructure", dec!(3580.40), 0.02, 2_300_000),
    ("AXISBANK", "Axis Bank", "Banking", dec!(1120.90), 0.023, 8_900_000),
    ("ASIANPAINT", "Asian Paints", "Paints", dec!(2890.50), 0.015, 1_300_000),
    ("MARUTI", "Maruti Suzuki India", "Automobile", dec!(12850.75), 0.022, 450_000),
    ("BAJFINANCE", "Bajaj Finance", "Finance", dec!(7250.60), 0.025, 1_200_000),
    ("WIPRO", "Wipro", "IT", dec!(565.40), 0.018, 7_400_000),
    ("TECHM", "Tech Mahindra", "IT", dec!(1685.30), 0.019, 2_600_000),
    ("HCLTECH", "HCL Technologies", "IT", dec!(1890.80), 0.017, 2_900_000),
    ("SUNPHARMA", "Sun Pharmaceutical", "Pharma", dec!(1745.90), 0.016, 3_100_000),
    ("TITAN", "Titan Company", "Jewellery", dec!(3420.50), 0.02, 1_100_000),
];

const BANKING_MEMBERS: &[&str] = &["HDFCBANK", "ICICIBANK", "SBIN", "KOTAKBANK", "AXISBANK"];

pub fn default_stocks() -> Vec<StockMetadata> {
    NSE_LARGE_CAPS
        .iter()
        .map(
            |&(symbol, name, sector, base_price, volatility, baseline_volume)| StockMetadata {
                symbol: symbol.to_string(),
                name: name.to_string(),
                sector: sector.to_string(),
                base_price,
                volatility,
                baseline_volume,
            },
        )
        .collect()
}

pub fn default_indices() -> Vec<IndexDefinition> {
    vec![
        IndexDefinition {
            name: "NIFTY 50".to_string(),
            base_level: dec!(22500),
            constituents: NSE_LARGE_CAPS
                .iter()
                .map(|entry| entry.0.to_string())
                .collect(),
        },
        IndexDefinition {
            name: "BANK NIFTY".to_string(),
            base_level: dec!(48200),
            constituents: BANKING_MEMBERS.iter().map(|s| s.to_string()).collect(),
        },
    ]
}
