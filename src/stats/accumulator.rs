//! Statistics Accumulator

use std::collections::HashMap;
use std::sync::Mutex;

lazy_static! {
    pub static ref STATS_ACCUMULATOR: Mutex<StatsAccumulator> = Mutex::new(StatsAccumulator::new());
}

pub struct StatsAccumulator {
    counters: HashMap<String, i64>,
    ratios: HashMap<String, (i64, i64)>,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self {
            counters: HashMap::new(),
            ratios: HashMap::new(),
        }
    }

    pub fn report_counter(&mut self, name: &str, val: i64) {
        if let Some(v) = self.counters.get_mut(name) {
            *v += val;
        } else {
            self.counters.insert(name.to_string(), val);
        }
    }

    pub fn report_ratio(&mut self, name: &str, num: i64, denom: i64) {
        if let Some(v) = self.ratios.get_mut(name) {
            v.0 += num;
            v.1 += denom;
        } else {
            self.ratios.insert(name.to_string(), (num, denom));
        }
    }

    /// Returns the accumulated value of a counter; used by tests and
    /// diagnostics.
    pub fn counter(&self, name: &str) -> i64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn print(&self) {
        let mut to_print: HashMap<String, Vec<String>> = HashMap::new();

        for (k, v) in self.counters.iter() {
            if *v == 0 {
                continue;
            }

            let (category, title) = get_category_and_title(k);
            let s = format!("{:-42}               {:12}", title, v).to_string();

            if let Some(list) = to_print.get_mut(&category) {
                list.push(s);
            } else {
                to_print.insert(category, vec![s]);
            }
        }

        for (k, (num, denom)) in self.ratios.iter() {
            if *denom == 0 {
                continue;
            }
            let (category, title) = get_category_and_title(k);
            let s = format!(
                "{:-42}{:12} / {:12} ({:.2}x)",
                title,
                *num,
                *denom,
                *num as f64 / *denom as f64
            );
            if let Some(list) = to_print.get_mut(&category) {
                list.push(s);
            } else {
                to_print.insert(category, vec![s]);
            }
        }

        println!("Statistics:");
        for (category, items) in to_print {
            println!("  {category}");
            for item in items {
                println!("    {item}");
            }
        }
    }

    pub fn clear(&mut self) {
        self.counters.clear();
        self.ratios.clear();
    }
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

fn get_category_and_title(s: &str) -> (String, String) {
    if let Some(slash) = s.find('/') {
        let category = &s[0..slash];
        let title = &s[slash + 1..];
        (category.to_string(), title.to_string())
    } else {
        ("".to_string(), s.to_string())
    }
}
