//! Spreadsheet CSV exports: header row first, fields referenced by header name.

use std::collections::HashMap;

use csv::ReaderBuilder;
use serde::de::DeserializeOwned;

use crate::models::{OpinionRow, TravelRow, VenueRow};

/// A single data row keyed by header name.
pub type Record = HashMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum TabularError {
    #[error("CSV has no header row")]
    MissingHeader,
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

fn reader(text: &str) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes())
}

/// Parse delimited text into one header→value mapping per row.
/// Short rows leave their trailing columns out of the mapping.
pub fn parse_records(text: &str) -> Result<Vec<Record>, TabularError> {
    let mut rdr = reader(text);
    let headers = rdr.headers()?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(TabularError::MissingHeader);
    }

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        records.push(record);
    }
    Ok(records)
}

fn rows<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, TabularError> {
    let mut rdr = reader(text);
    if rdr.headers()?.iter().all(|h| h.is_empty()) {
        return Err(TabularError::MissingHeader);
    }
    let mut out = Vec::new();
    for result in rdr.deserialize::<T>() {
        out.push(result?);
    }
    Ok(out)
}

/// Venue rows that carry a city and both coordinate fields.
pub fn venues_from_csv(text: &str) -> Result<Vec<VenueRow>, TabularError> {
    let all: Vec<VenueRow> = rows(text)?;
    Ok(all
        .into_iter()
        .filter(|v| !v.city.is_empty() && !v.latitude.is_empty() && !v.longitude.is_empty())
        .collect())
}

/// Travel rows with a non-blank origin and destination.
pub fn travels_from_csv(text: &str) -> Result<Vec<TravelRow>, TabularError> {
    let all: Vec<TravelRow> = rows(text)?;
    Ok(all
        .into_iter()
        .filter(|t| !t.origin.trim().is_empty() && !t.destination.trim().is_empty())
        .collect())
}

/// Opinion rows with a non-blank message.
pub fn opinions_from_csv(text: &str) -> Result<Vec<OpinionRow>, TabularError> {
    let all: Vec<OpinionRow> = rows(text)?;
    Ok(all
        .into_iter()
        .filter(|o| !o.message.trim().is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VENUES: &str = "ciudad,lugar,latitud,longitud,fecha,agotado,porcentaje,link\n\
Madrid,Teatro Real,40.418,-3.711,2025-03-01,FALSE,80,https://tickets/1\n\
madrid ,Teatro Real,40.418,-3.711,2025-03-02,TRUE,100,\n\
Sevilla,Teatro Lope,,,2025-04-01,false,,\n\
,Nowhere,1.0,2.0,,,,\n";

    #[test]
    fn test_parse_records_maps_headers() {
        let records = parse_records("a,b\n1,2\n3,4\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["a"], "1");
        assert_eq!(records[1]["b"], "4");
    }

    #[test]
    fn test_parse_records_tolerates_short_rows() {
        let records = parse_records("a,b,c\n1,2\n").unwrap();
        assert_eq!(records[0].len(), 2);
        assert!(!records[0].contains_key("c"));
    }

    #[test]
    fn test_parse_records_quoted_fields() {
        let records = parse_records("name,msg\nAna,\"hola, qué tal\nadiós\"\n").unwrap();
        assert_eq!(records[0]["msg"], "hola, qué tal\nadiós");
    }

    #[test]
    fn test_parse_records_empty_input_is_missing_header() {
        assert!(matches!(parse_records(""), Err(TabularError::MissingHeader)));
    }

    #[test]
    fn test_venues_filter_missing_fields() {
        let venues = venues_from_csv(VENUES).unwrap();
        assert_eq!(venues.len(), 2);
        assert_eq!(venues[0].venue_name, "Teatro Real");
        assert!(!venues[0].sold_out);
        assert!(venues[1].sold_out);
        assert_eq!(venues[1].ticket_link, "");
    }

    #[test]
    fn test_travels_filter_blank_fields() {
        let text = "origen,destino\nMadrid,Barcelona\n  ,Madrid\nFrance,\nGermany,Madrid\n";
        let travels = travels_from_csv(text).unwrap();
        assert_eq!(travels.len(), 2);
        assert_eq!(travels[1].origin, "Germany");
    }

    #[test]
    fn test_opinions_filter_empty_messages() {
        let text = "nombre,pais,concierto,mensaje,redes\nAna,Spain,Madrid,Genial,@ana\nLuis,France,Paris,   ,\n";
        let opinions = opinions_from_csv(text).unwrap();
        assert_eq!(opinions.len(), 1);
        assert_eq!(opinions[0].social_links, "@ana");
    }

    #[test]
    fn test_missing_columns_default_to_empty() {
        let text = "mensaje\nHola\n";
        let opinions = opinions_from_csv(text).unwrap();
        assert_eq!(opinions[0].name, "");
        assert_eq!(opinions[0].message, "Hola");
    }
}
