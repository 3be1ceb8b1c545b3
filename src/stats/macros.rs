//! Macros

/// Create a thread local variable to track an `i64` counter across threads.
///
/// * `$title`     - Descriptive title of the statistic that uses `/` as a separator for categories.
///                  For example: "SpatialLightDistribution/Distributions created".
/// * `$var`       - An identifier for the thread local variable.
/// * `stats_func` - An identifier for the callback function used by `StatsRegistrar::call_stat_funcs()` to report to
///                  `StatsAccumulator`.
#[macro_export]
macro_rules! stat_counter {
    ($title: expr, $var: ident, $stats_func: ident $(,)?) => {
        thread_local! { static $var: std::cell::RefCell<i64> = std::cell::RefCell::new(0); }

        pub fn $stats_func(accum: &mut StatsAccumulator) {
            // Report thread stats.
            let val = $var.with(|v| *v.borrow());
            accum.report_counter($title, val);

            // Reset thread stats.
            $var.with(|v| {
                *v.borrow_mut() = 0;
            });
        }
    };
}

/// Create thread local variables to track `i64` values for numerator/denominator across threads.
///
/// * `$title`     - Descriptive title of the statistic that uses `/` as a separator for categories.
///                  For example: "SpatialLightDistribution/Lookups per distribution".
/// * `$var_num`   - An identifier for the thread local variable for numerator.
/// * `$var_denom` - An identifier for the thread local variable for denominator.
/// * `stats_func` - An identifier for the callback function used by `StatsRegistrar::call_stat_funcs()` to report to
///                  `StatsAccumulator`.
#[macro_export]
macro_rules! stat_ratio {
    ($title: expr, $var_num: ident, $var_denom: ident, $stats_func: ident $(,)?) => {
        thread_local! {
            static $var_num: std::cell::RefCell<i64> = std::cell::RefCell::new(0);
            static $var_denom: std::cell::RefCell<i64> = std::cell::RefCell::new(0);
        }

        pub fn $stats_func(accum: &mut StatsAccumulator) {
            // Report thread stats.
            let num = $var_num.with(|v| *v.borrow());
            let denom = $var_denom.with(|v| *v.borrow());
            accum.report_ratio($title, num, denom);

            // Reset thread stats.
            $var_num.with(|v| {
                *v.borrow_mut() = 0;
            });
            $var_denom.with(|v| {
                *v.borrow_mut() = 0;
            });
        }
    };
}

/// Convenience macro to increment a thread local variable for counter/ratio statistics.
#[macro_export]
macro_rules! stat_inc {
    ($var: ident, $val: expr) => {
        $var.with(|v| *v.borrow_mut() += $val);
    };
}

/// Convenience macro to register the callback functions for statistics.
///
/// * `$($func: ident),+` - One or more callback functions created by the `stat_*` macros.
#[macro_export]
macro_rules! stat_register_fns {
    ($($stat_func: ident),+ $(,)?) => {
        lazy_static! {
            /// Used to ensure stats are registered exactly once in the module's private scope.
            static ref IS_STATS_REGISTERED: std::sync::Mutex<bool> = std::sync::Mutex::new(false);
        }

        /// Call this function in a module core/top-level struct to register the statistics. Typically done in `new()`.
        fn register_stats() {
            let mut is_registered = IS_STATS_REGISTERED.lock().unwrap();
            if !*is_registered {
                let mut sr = STATS_REGISTRAR.lock().unwrap();
                $(
                    sr.register_stat_func($stat_func);
                )+
                *is_registered = true;
            }
        }
    };
}

/// Convenience macro to accumulate thread local statistics in `STATS_ACCUMULATOR`. This will call the registered
/// callbacks created with `stat_*` macros. This should be called at the end of each spawned thread and at the end of
/// rendering a scene from the main thread.
#[macro_export]
macro_rules! report_stats {
    () => {{
        let mut accum = STATS_ACCUMULATOR.lock().unwrap();
        STATS_REGISTRAR.lock().unwrap().call_stat_funcs(&mut accum);
    }};
}

/// Convenience macro to print accumulated statistic in `STATS_ACCUMULATOR`.
#[macro_export]
macro_rules! print_stats {
    () => {{
        STATS_ACCUMULATOR.lock().unwrap().print();
    }};
}

/// Convenience macro to clear accumulated statistic in `STATS_ACCUMULATOR`.
#[macro_export]
macro_rules! clear_stats {
    () => {{
        STATS_ACCUMULATOR.lock().unwrap().clear();
    }};
}
