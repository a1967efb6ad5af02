//! View model behind the students table: filter, sort, then paginate a
//! snapshot of the store.

use crate::store::StudentRecord;
use std::cmp::Ordering;

/// Separator placed between column values when matching the filter, so a
/// term cannot match across two adjacent columns.
const FILTER_SEPARATOR: char = '◬';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Cedula,
    FirstName,
    LastName,
    Score1,
    Score2,
    Attendance,
    Average,
    Status,
}

impl SortColumn {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cedula" => Some(Self::Cedula),
            "firstName" => Some(Self::FirstName),
            "lastName" => Some(Self::LastName),
            "score1" => Some(Self::Score1),
            "score2" => Some(Self::Score2),
            "attendance" => Some(Self::Attendance),
            "average" => Some(Self::Average),
            "status" => Some(Self::Status),
            _ => None,
        }
    }

    fn compare(self, a: &StudentRecord, b: &StudentRecord) -> Ordering {
        match self {
            Self::Cedula => a.cedula.cmp(&b.cedula),
            Self::FirstName => a.first_name.cmp(&b.first_name),
            Self::LastName => a.last_name.cmp(&b.last_name),
            Self::Score1 => a.score1.total_cmp(&b.score1),
            Self::Score2 => a.score2.total_cmp(&b.score2),
            Self::Attendance => a.attendance.total_cmp(&b.attendance),
            Self::Average => a.average.total_cmp(&b.average),
            Self::Status => a.status.label().cmp(b.status.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// `""` means "not sorted" and yields `None` inside `Some`.
    pub fn parse(s: &str) -> Option<Option<Self>> {
        match s {
            "asc" => Some(Some(Self::Asc)),
            "desc" => Some(Some(Self::Desc)),
            "" => Some(None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filter: String,
    pub sort: Option<Sort>,
    pub page_index: usize,
    pub page_size: usize,
}

#[derive(Debug, Clone)]
pub struct Page<'a> {
    pub rows: Vec<&'a StudentRecord>,
    pub total: usize,
    pub filtered_total: usize,
    pub page_index: usize,
    pub page_size: usize,
}

fn filter_text(r: &StudentRecord) -> String {
    let cols = [
        r.cedula.clone(),
        r.first_name.clone(),
        r.last_name.clone(),
        r.score1.to_string(),
        r.score2.to_string(),
        r.attendance.to_string(),
        r.average.to_string(),
        r.status.label().to_string(),
    ];
    let mut out = String::new();
    for c in cols {
        out.push_str(&c);
        out.push(FILTER_SEPARATOR);
    }
    out.to_lowercase()
}

pub fn matches_filter(r: &StudentRecord, filter: &str) -> bool {
    let needle = filter.trim().to_lowercase();
    needle.is_empty() || filter_text(r).contains(&needle)
}

pub fn query<'a>(records: &'a [StudentRecord], q: &ListQuery) -> Page<'a> {
    let mut rows: Vec<&StudentRecord> = records
        .iter()
        .filter(|r| matches_filter(r, &q.filter))
        .collect();

    if let Some(sort) = q.sort {
        // sort_by is stable, ties keep insertion order.
        rows.sort_by(|a, b| {
            let ord = sort.column.compare(a, b);
            match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }

    let filtered_total = rows.len();
    let page_size = q.page_size.max(1);
    let last_page = filtered_total.saturating_sub(1) / page_size;
    let page_index = q.page_index.min(last_page);
    let start = page_index * page_size;
    let rows = rows.into_iter().skip(start).take(page_size).collect();

    Page {
        rows,
        total: records.len(),
        filtered_total,
        page_index,
        page_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::ValidStudent;
    use crate::rules::Thresholds;
    use chrono::Utc;

    fn rec(cedula: &str, first: &str, last: &str, s1: f64, s2: f64, att: f64) -> StudentRecord {
        StudentRecord::derive(
            ValidStudent {
                cedula: cedula.into(),
                first_name: first.into(),
                last_name: last.into(),
                score1: s1,
                score2: s2,
                attendance: att,
            },
            &Thresholds::default(),
            Utc::now(),
        )
    }

    fn sample() -> Vec<StudentRecord> {
        vec![
            rec("0000000003", "Carla", "Vera", 9.0, 9.0, 90.0),
            rec("0000000001", "Andres", "Lopez", 4.0, 5.0, 95.0),
            rec("0000000002", "Bruno", "Diaz", 8.0, 6.0, 60.0),
            rec("0000000004", "Dana", "Lopez", 7.0, 7.0, 80.0),
        ]
    }

    fn cedulas(p: &Page<'_>) -> Vec<String> {
        p.rows.iter().map(|r| r.cedula.clone()).collect()
    }

    fn q(filter: &str, sort: Option<Sort>, page_index: usize, page_size: usize) -> ListQuery {
        ListQuery {
            filter: filter.into(),
            sort,
            page_index,
            page_size,
        }
    }

    #[test]
    fn filter_is_case_insensitive_and_trimmed() {
        let data = sample();
        let p = query(&data, &q("  LOPEZ ", None, 0, 10));
        assert_eq!(cedulas(&p), vec!["0000000001", "0000000004"]);
        assert_eq!(p.total, 4);
        assert_eq!(p.filtered_total, 2);
    }

    #[test]
    fn filter_matches_status_label() {
        let data = sample();
        let p = query(&data, &q("asistencia", None, 0, 10));
        assert_eq!(cedulas(&p), vec!["0000000002"]);
    }

    #[test]
    fn filter_does_not_span_columns() {
        let data = sample();
        // "vera" followed by "9" only matches if columns were glued together.
        let p = query(&data, &q("vera9", None, 0, 10));
        assert!(p.rows.is_empty());
    }

    #[test]
    fn sort_numeric_desc_and_text_asc() {
        let data = sample();
        let by_avg = Sort {
            column: SortColumn::Average,
            direction: SortDirection::Desc,
        };
        let p = query(&data, &q("", Some(by_avg), 0, 10));
        assert_eq!(
            cedulas(&p),
            vec!["0000000003", "0000000002", "0000000004", "0000000001"]
        );

        let by_last = Sort {
            column: SortColumn::LastName,
            direction: SortDirection::Asc,
        };
        let p = query(&data, &q("", Some(by_last), 0, 10));
        // Ties on "Lopez" keep insertion order.
        assert_eq!(
            cedulas(&p),
            vec!["0000000002", "0000000001", "0000000004", "0000000003"]
        );
    }

    #[test]
    fn unsorted_keeps_insertion_order() {
        let data = sample();
        let p = query(&data, &q("", None, 0, 10));
        assert_eq!(
            cedulas(&p),
            vec!["0000000003", "0000000001", "0000000002", "0000000004"]
        );
    }

    #[test]
    fn pagination_clamps_to_last_page() {
        let data = sample();
        let p = query(&data, &q("", None, 1, 3));
        assert_eq!(cedulas(&p), vec!["0000000004"]);

        let p = query(&data, &q("", None, 7, 3));
        assert_eq!(p.page_index, 1);
        assert_eq!(cedulas(&p), vec!["0000000004"]);

        let empty: Vec<StudentRecord> = Vec::new();
        let p = query(&empty, &q("", None, 3, 5));
        assert_eq!(p.page_index, 0);
        assert!(p.rows.is_empty());
    }

    #[test]
    fn parse_sort_params() {
        assert_eq!(SortColumn::parse("average"), Some(SortColumn::Average));
        assert_eq!(SortColumn::parse("promedio"), None);
        assert_eq!(SortDirection::parse(""), Some(None));
        assert_eq!(SortDirection::parse("desc"), Some(Some(SortDirection::Desc)));
        assert_eq!(SortDirection::parse("down"), None);
    }
}
