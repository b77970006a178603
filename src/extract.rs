use std::str::FromStr;

use log::{debug, info, warn};
use rust_decimal::Decimal;

use crate::cube::{DateCube, Envelope};
use crate::error::{RatesError, Result};
use crate::exchange_rate::{ExchangeRateRecord, RateMap};
use crate::store::RateStore;

/// Upper bound on date-groups written by one ingestion run.
pub const MAX_RECORDS_PER_RUN: usize = 5;

const MISSING_DATE: &str = "None";

/// Parses a feed document into at most [`MAX_RECORDS_PER_RUN`] records,
/// keeping the earliest date-groups in document order.
pub fn extract_records(xml: &[u8]) -> Result<Vec<ExchangeRateRecord>> {
    let text = std::str::from_utf8(xml).map_err(|e| RatesError::Parse(e.to_string()))?;
    let envelope: Envelope = quick_xml::de::from_str(text)?;

    let mut records = Vec::new();
    for day in envelope.days() {
        if records.len() >= MAX_RECORDS_PER_RUN {
            break;
        }

        let Some(date) = group_date(day) else {
            debug!("Skipping date-group without a time attribute");
            continue;
        };

        records.push(ExchangeRateRecord::new(date, get_rates_map(day)?));
    }

    Ok(records)
}

/// Parses `xml` and upserts every accepted record. Returns the number written.
pub async fn store_rates(xml: &[u8], store: &dyn RateStore) -> Result<usize> {
    let records = extract_records(xml)?;

    for record in &records {
        info!(
            "Storing {} rates for {}",
            record.exchange_rates.len(),
            record.date
        );
        store.put(record).await?;
    }

    Ok(records.len())
}

fn group_date(day: &DateCube) -> Option<&str> {
    day.time
        .as_deref()
        .filter(|time| *time != MISSING_DATE)
}

fn get_rates_map(day: &DateCube) -> Result<RateMap> {
    let mut map = RateMap::new();

    for cube in &day.rates {
        let Some(currency) = &cube.currency else {
            warn!("Rate entry without currency code ignored");
            continue;
        };
        map.insert(currency.clone(), parse_rate(cube.rate.as_deref())?);
    }

    Ok(map)
}

/// Coerces a feed rate into an exact decimal. Absent, empty, `NaN` and `NULL`
/// rates become zero; negative rates are rejected.
pub fn parse_rate(raw: Option<&str>) -> Result<Decimal> {
    let value = match raw.map(str::trim) {
        None | Some("") | Some("NaN") | Some("NULL") => return Ok(Decimal::ZERO),
        Some(value) => value,
    };

    let rate = Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|e| RatesError::Parse(format!("invalid rate {value:?}: {e}")))?;
    if rate.is_sign_negative() && !rate.is_zero() {
        return Err(RatesError::Parse(format!("negative rate {value:?}")));
    }

    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRateStore;
    use rust_decimal_macros::dec;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gesmes:Envelope xmlns:gesmes="http://www.gesmes.org/xml/2002-08-01" xmlns="http://www.ecb.int/vocabulary/2002-08-01/eurofxref">
    <gesmes:subject>Reference rates</gesmes:subject>
    <gesmes:Sender>
        <gesmes:name>European Central Bank</gesmes:name>
    </gesmes:Sender>
    <Cube>
        <Cube time="2024-07-09">
            <Cube currency="USD" rate="1.0814"/>
            <Cube currency="JPY" rate="174.2"/>
            <!-- more currencies -->
        </Cube>
    </Cube>
</gesmes:Envelope>"#;

    fn feed_with_days(dates: &[&str]) -> String {
        let days: String = dates
            .iter()
            .map(|date| {
                format!(r#"<Cube time="{date}"><Cube currency="USD" rate="1.08"/></Cube>"#)
            })
            .collect();
        format!(r#"<gesmes:Envelope xmlns:gesmes="http://www.gesmes.org/xml/2002-08-01"><Cube>{days}</Cube></gesmes:Envelope>"#)
    }

    #[test]
    fn parses_sample_feed() {
        let records = extract_records(SAMPLE_FEED.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "2024-07-09");
        assert_eq!(records[0].exchange_rates.len(), 2);
        assert_eq!(records[0].exchange_rates["USD"], dec!(1.0814));
        assert_eq!(records[0].exchange_rates["JPY"], dec!(174.2));
        assert_eq!(records[0].exchange_rates["JPY"].to_string(), "174.2");
    }

    #[test]
    fn keeps_every_group_under_the_cap() {
        let xml = feed_with_days(&["2024-07-09", "2024-07-08", "2024-07-05"]);
        let records = extract_records(xml.as_bytes()).unwrap();

        let dates: Vec<_> = records.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, ["2024-07-09", "2024-07-08", "2024-07-05"]);
    }

    #[test]
    fn caps_at_first_five_groups() {
        let xml = feed_with_days(&[
            "2024-07-09",
            "2024-07-08",
            "2024-07-05",
            "2024-07-04",
            "2024-07-03",
            "2024-07-02",
            "2024-07-01",
        ]);
        let records = extract_records(xml.as_bytes()).unwrap();

        assert_eq!(records.len(), MAX_RECORDS_PER_RUN);
        assert_eq!(records[0].date, "2024-07-09");
        assert_eq!(records[4].date, "2024-07-03");
    }

    #[test]
    fn groups_past_the_cap_are_not_coerced() {
        let mut xml = feed_with_days(&[
            "2024-07-09",
            "2024-07-08",
            "2024-07-05",
            "2024-07-04",
            "2024-07-03",
        ]);
        xml = xml.replace(
            "</Cube></gesmes:Envelope>",
            r#"<Cube time="2024-07-02"><Cube currency="USD" rate="garbage"/></Cube></Cube></gesmes:Envelope>"#,
        );

        let records = extract_records(xml.as_bytes()).unwrap();
        assert_eq!(records.len(), 5);
    }

    #[test]
    fn skips_groups_without_a_date() {
        let xml = r#"<Envelope><Cube>
            <Cube><Cube currency="USD" rate="1.1"/></Cube>
            <Cube time="None"><Cube currency="USD" rate="1.2"/></Cube>
            <Cube time="2024-07-09"><Cube currency="USD" rate="1.3"/></Cube>
        </Cube></Envelope>"#;

        let records = extract_records(xml.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "2024-07-09");
        assert_eq!(records[0].exchange_rates["USD"], dec!(1.3));
    }

    #[test]
    fn invalid_rates_become_zero() {
        let xml = r#"<Envelope><Cube><Cube time="2024-07-09">
            <Cube currency="USD" rate="NaN"/>
            <Cube currency="GBP" rate="NULL"/>
            <Cube currency="JPY"/>
            <Cube currency="CHF" rate="0.9712"/>
        </Cube></Cube></Envelope>"#;

        let records = extract_records(xml.as_bytes()).unwrap();
        let rates = &records[0].exchange_rates;

        assert_eq!(rates.len(), 4);
        assert_eq!(rates["USD"], Decimal::ZERO);
        assert_eq!(rates["GBP"], Decimal::ZERO);
        assert_eq!(rates["JPY"], Decimal::ZERO);
        assert_eq!(rates["CHF"], dec!(0.9712));
    }

    #[test]
    fn duplicate_currency_last_value_wins() {
        let xml = r#"<Envelope><Cube><Cube time="2024-07-09">
            <Cube currency="USD" rate="1.1"/>
            <Cube currency="USD" rate="1.2"/>
        </Cube></Cube></Envelope>"#;

        let records = extract_records(xml.as_bytes()).unwrap();
        assert_eq!(records[0].exchange_rates["USD"], dec!(1.2));
    }

    #[test]
    fn parse_rate_is_exact() {
        assert_eq!(parse_rate(Some("1.0814")).unwrap().to_string(), "1.0814");
        assert_eq!(parse_rate(Some(" 174.20 ")).unwrap().to_string(), "174.20");
        assert_eq!(parse_rate(Some("1.5E+2")).unwrap(), dec!(150));
        assert_eq!(parse_rate(Some("")).unwrap(), Decimal::ZERO);
        assert_eq!(parse_rate(None).unwrap(), Decimal::ZERO);
        assert!(matches!(parse_rate(Some("abc")), Err(RatesError::Parse(_))));
    }

    #[test]
    fn negative_rates_are_rejected() {
        assert!(matches!(parse_rate(Some("-1.08")), Err(RatesError::Parse(_))));
        assert!(matches!(
            parse_rate(Some("-79228162514264337593543950335")),
            Err(RatesError::Parse(_))
        ));
        assert_eq!(parse_rate(Some("-0")).unwrap(), Decimal::ZERO);

        let xml = r#"<Envelope><Cube><Cube time="2024-07-09">
            <Cube currency="USD" rate="-1.08"/>
        </Cube></Cube></Envelope>"#;
        assert!(matches!(extract_records(xml.as_bytes()), Err(RatesError::Parse(_))));
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let result = extract_records(b"<Envelope><Cube><Cube time=\"2024-07-09\">");
        assert!(matches!(result, Err(RatesError::Parse(_))));
    }

    #[tokio::test]
    async fn stores_sample_feed() {
        let store = InMemoryRateStore::default();

        let written = store_rates(SAMPLE_FEED.as_bytes(), &store).await.unwrap();

        assert_eq!(written, 1);
        let record = store.get("2024-07-09").await.unwrap().unwrap();
        assert_eq!(
            record,
            ExchangeRateRecord::new(
                "2024-07-09",
                RateMap::from([
                    ("USD".to_string(), dec!(1.0814)),
                    ("JPY".to_string(), dec!(174.2)),
                ]),
            )
        );
    }

    #[tokio::test]
    async fn store_rates_replaces_existing_record() {
        let store = InMemoryRateStore::default();
        store
            .put(&ExchangeRateRecord::new(
                "2024-07-09",
                RateMap::from([("GBP".to_string(), dec!(0.85))]),
            ))
            .await
            .unwrap();

        store_rates(SAMPLE_FEED.as_bytes(), &store).await.unwrap();

        let record = store.get("2024-07-09").await.unwrap().unwrap();
        assert!(!record.exchange_rates.contains_key("GBP"));
        assert_eq!(store.len().await, 1);
    }
}
