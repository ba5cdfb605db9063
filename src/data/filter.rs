use std::collections::BTreeSet;

use super::model::{Sex, StatRow, StatisticTable};

// ---------------------------------------------------------------------------
// Row predicate: country membership, exact sex, exact year
// ---------------------------------------------------------------------------

/// Predicate values for [`filter_rows`].
///
/// A `None` field places no restriction on that axis. The map view leaves
/// `countries` unset, the year-series view leaves `year` unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    pub countries: Option<BTreeSet<String>>,
    pub sex: Option<Sex>,
    pub year: Option<i32>,
}

impl RowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = Some(countries.into_iter().map(Into::into).collect());
        self
    }

    pub fn sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn matches(&self, row: &StatRow) -> bool {
        if let Some(countries) = &self.countries {
            if !countries.contains(&row.country) {
                return false;
            }
        }
        if let Some(sex) = self.sex {
            if row.sex != sex {
                return false;
            }
        }
        if let Some(year) = self.year {
            if row.year != year {
                return false;
            }
        }
        true
    }
}

/// Return the rows of `table` that pass `filter`, in table order.
///
/// An empty result is a valid outcome (nothing selected, or no data for the
/// chosen combination).
pub fn filter_rows<'a>(table: &'a StatisticTable, filter: &RowFilter) -> Vec<&'a StatRow> {
    table.rows.iter().filter(|row| filter.matches(row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{row, table};
    use crate::data::model::{Statistic, ValueColumns};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn exact_match_returns_single_row() {
        let t = table(Statistic::Deaths);
        let rows = filter_rows(
            &t,
            &RowFilter::new().countries(["France"]).sex(Sex::All).year(2000),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].country, "France");
        assert_eq!(rows[0].value(1), Some(12.3));
    }

    #[test]
    fn unset_predicates_do_not_restrict() {
        let t = table(Statistic::Deaths);
        assert_eq!(filter_rows(&t, &RowFilter::new()).len(), t.len());

        let map_rows = filter_rows(&t, &RowFilter::new().sex(Sex::All).year(2001));
        let names: Vec<_> = map_rows.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, vec!["France", "Japan"]);
    }

    #[test]
    fn absent_country_yields_empty_not_error() {
        let t = table(Statistic::Deaths);
        let rows = filter_rows(&t, &RowFilter::new().countries(["Atlantis"]));
        assert!(rows.is_empty());
    }

    #[test]
    fn empty_country_set_selects_nothing() {
        let t = table(Statistic::Deaths);
        let rows = filter_rows(&t, &RowFilter::new().countries(Vec::<String>::new()));
        assert!(rows.is_empty());
    }

    #[test]
    fn single_country_filter_only_returns_that_country() {
        let t = table(Statistic::Rate);
        let rows = filter_rows(&t, &RowFilter::new().countries(["Japan"]));
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.country == "Japan"));
    }

    const COUNTRIES: [&str; 4] = ["France", "Japan", "Peru", "Kenya"];

    fn arb_row() -> impl Strategy<Value = StatRow> {
        (0..COUNTRIES.len(), 0..3usize, 1990..1995i32, proptest::option::of(0.0..1e6f64))
            .prop_map(|(c, s, year, v)| row(COUNTRIES[c], Sex::ALL[s], year, &[v]))
    }

    fn arb_table() -> impl Strategy<Value = StatisticTable> {
        proptest::collection::vec(arb_row(), 0..40).prop_map(|rows| {
            let mut seen = BTreeSet::new();
            let unique = rows
                .into_iter()
                .filter(|r| seen.insert((r.country.clone(), r.sex, r.year)))
                .collect();
            StatisticTable::new(Statistic::Deaths, ValueColumns::new(["0-4"]), unique)
                .expect("deduplicated")
        })
    }

    fn arb_filter() -> impl Strategy<Value = RowFilter> {
        (
            proptest::option::of(proptest::collection::btree_set(
                proptest::sample::select(COUNTRIES.to_vec()),
                0..3,
            )),
            proptest::option::of(proptest::sample::select(Sex::ALL.to_vec())),
            proptest::option::of(1989..1996i32),
        )
            .prop_map(|(countries, sex, year)| RowFilter {
                countries: countries.map(|set| set.into_iter().map(String::from).collect()),
                sex,
                year,
            })
    }

    proptest! {
        #[test]
        fn filter_is_sound_complete_and_stable(t in arb_table(), f in arb_filter()) {
            let out = filter_rows(&t, &f);

            for r in &out {
                if let Some(cs) = &f.countries {
                    prop_assert!(cs.contains(&r.country));
                }
                if let Some(sex) = f.sex {
                    prop_assert_eq!(r.sex, sex);
                }
                if let Some(year) = f.year {
                    prop_assert_eq!(r.year, year);
                }
            }

            let expected: Vec<&StatRow> = t
                .rows
                .iter()
                .filter(|r| {
                    f.countries.as_ref().map_or(true, |cs| cs.contains(&r.country))
                        && f.sex.map_or(true, |s| r.sex == s)
                        && f.year.map_or(true, |y| r.year == y)
                })
                .collect();
            prop_assert_eq!(out.len(), expected.len());
            for (got, want) in out.iter().zip(expected.iter()) {
                prop_assert!(std::ptr::eq(*got, *want));
            }
        }
    }
}
