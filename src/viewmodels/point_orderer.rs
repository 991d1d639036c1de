// ============================================================================
// POINT ORDERER - Orden del recorrido (índice numérico o fecha de creación)
// ============================================================================
// Estrategia todo-o-nada por lote: si UN registro no tiene índice parseable,
// el lote completo se ordena por created_at. Ordenación estable.
// ============================================================================

use std::cmp::Ordering;

use crate::models::LocationRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStrategy {
    Index,
    CreatedAt,
}

pub struct PointOrderer;

impl PointOrderer {
    pub fn strategy(records: &[LocationRecord], index_column: Option<&str>) -> OrderStrategy {
        let has_column = index_column.map(|c| !c.trim().is_empty()).unwrap_or(false);
        let all_indexed = records
            .iter()
            .all(|r| r.index_key.as_ref().and_then(|k| k.as_number()).is_some());

        if has_column && all_indexed {
            OrderStrategy::Index
        } else {
            OrderStrategy::CreatedAt
        }
    }

    /// Copia ordenada para el trazado; los marcadores usan el orden de llegada
    pub fn order(records: &[LocationRecord], index_column: Option<&str>) -> Vec<LocationRecord> {
        let strategy = Self::strategy(records, index_column);
        let mut ordered = records.to_vec();

        match strategy {
            OrderStrategy::Index => ordered.sort_by(|a, b| {
                let a = a.index_key.as_ref().and_then(|k| k.as_number());
                let b = b.index_key.as_ref().and_then(|k| k.as_number());
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }),
            OrderStrategy::CreatedAt => ordered.sort_by_key(|r| r.created_at),
        }

        log::debug!("🧭 {} puntos ordenados por {:?}", ordered.len(), strategy);
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndexKey;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::Map;

    fn record(id: &str, minutes: i64, index: Option<IndexKey>) -> LocationRecord {
        LocationRecord {
            id: id.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes),
            latitude: 40.7,
            longitude: -74.0,
            index_key: index,
            extra: Map::new(),
        }
    }

    fn ids(records: &[LocationRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_orders_by_numeric_index() {
        let batch = vec![
            record("b", 0, Some(IndexKey::Text("2".to_string()))),
            record("a", 1, Some(IndexKey::Text("1".to_string()))),
        ];
        let ordered = PointOrderer::order(&batch, Some("seq"));
        assert_eq!(ids(&ordered), vec!["a", "b"]);
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        let batch = vec![
            record("ten", 0, Some(IndexKey::Text("10".to_string()))),
            record("nine", 1, Some(IndexKey::Number(9.0))),
        ];
        assert_eq!(ids(&PointOrderer::order(&batch, Some("seq"))), vec!["nine", "ten"]);
    }

    #[test]
    fn test_one_missing_index_falls_back_to_timestamp_for_whole_batch() {
        // Filas newest-first, como llegan del backend
        let batch = vec![
            record("newer", 5, Some(IndexKey::Text("2".to_string()))),
            record("older", 1, None),
        ];
        assert_eq!(PointOrderer::strategy(&batch, Some("seq")), OrderStrategy::CreatedAt);
        assert_eq!(ids(&PointOrderer::order(&batch, Some("seq"))), vec!["older", "newer"]);
    }

    #[test]
    fn test_unparsable_index_falls_back() {
        let batch = vec![
            record("x", 3, Some(IndexKey::Text("1".to_string()))),
            record("y", 2, Some(IndexKey::Text("n/a".to_string()))),
        ];
        assert_eq!(ids(&PointOrderer::order(&batch, Some("seq"))), vec!["y", "x"]);
    }

    #[test]
    fn test_ties_keep_fetch_order() {
        let batch = vec![
            record("first", 9, Some(IndexKey::Number(1.0))),
            record("second", 1, Some(IndexKey::Number(1.0))),
            record("zero", 4, Some(IndexKey::Number(0.0))),
        ];
        assert_eq!(ids(&PointOrderer::order(&batch, Some("seq"))), vec!["zero", "first", "second"]);
    }

    #[test]
    fn test_without_index_column_uses_timestamp() {
        let batch = vec![
            record("b", 2, Some(IndexKey::Number(1.0))),
            record("a", 1, Some(IndexKey::Number(2.0))),
        ];
        assert_eq!(ids(&PointOrderer::order(&batch, None)), vec!["a", "b"]);
        assert!(PointOrderer::order(&[], Some("seq")).is_empty());
    }
}
