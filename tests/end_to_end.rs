//! End-to-end tests of the combined rolling forecaster on synthetic market
//! series.

use realty_forecast::config::ForecastConfig;
use realty_forecast::core::{FeatureMatrix, Frame};
use realty_forecast::error::ForecastError;
use realty_forecast::features::FeatureEngineering;
use realty_forecast::models::{RollingCombined, RollingRegression, StructuralForecaster};
use realty_forecast::regression::ModelKind;
use realty_forecast::utils::stats::population_std_dev;
use std::f64::consts::PI;

const TARGET: &str = "count_sale";

/// Linear trend plus a 12-month sine, no noise.
fn truth(t: usize) -> f64 {
    200.0 + 0.5 * t as f64 + 5.0 * (2.0 * PI * t as f64 / 12.0).sin()
}

fn months(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("{}-{:02}", 2016 + i / 12, i % 12 + 1))
        .collect()
}

/// Engineered frame (level, lags 1 and 3, pct 1, month one-hots) and its
/// feature list.
fn engineered(values: Vec<f64>) -> (Frame, Vec<String>) {
    let frame = Frame::new(months(values.len()))
        .unwrap()
        .with_column(TARGET, values)
        .unwrap();
    FeatureEngineering::new(frame, &[TARGET])
        .unwrap()
        .create_lag_features(&[1, 3])
        .unwrap()
        .create_pct_change_features(&[1])
        .unwrap()
        .create_month_one_hot()
        .unwrap()
        .into_parts()
}

fn quick_config(features: Vec<String>) -> ForecastConfig {
    ForecastConfig::new(TARGET, features)
        .with_horizons(3, 6)
        .with_num_bootstrap_samples(6)
        .with_variational_steps(20)
        .with_lasso(10, 5)
        .with_seed(17)
}

fn parts(frame: &Frame, config: &ForecastConfig) -> (FeatureMatrix, Vec<f64>) {
    (
        frame.select(&config.feature_column_names).unwrap(),
        frame.column(TARGET).unwrap().to_vec(),
    )
}

#[test]
fn noiseless_trend_and_season_is_recovered() {
    let (frame, features) = engineered((0..48).map(truth).collect());
    let config = ForecastConfig::new(TARGET, features)
        .with_horizons(3, 6)
        .with_blend_weights(0.5, 0.5)
        .with_start_fit(3)
        .with_num_bootstrap_samples(20)
        .with_lasso(20, 5)
        .with_seed(42);
    let model = RollingCombined::new(&frame, config).unwrap();
    let bundle = model
        .make_prediction(model.features(), model.target())
        .unwrap();

    assert_eq!(bundle.horizon(), 6);
    assert_eq!(bundle.num_samples(), 20);
    for (k, point) in bundle.point().iter().enumerate() {
        let expected = truth(48 + k);
        assert!(
            (point - expected).abs() < 0.01 * expected,
            "step {}: forecast {} vs truth {}",
            k + 1,
            point,
            expected
        );
    }
}

/// Trend and season with a deterministic irregular component.
fn noisy(t: usize) -> f64 {
    truth(t) + 3.0 * ((t * 7919) as f64).sin()
}

fn assert_tracks_truth(point: &[f64], tolerance: f64) {
    for (k, point) in point.iter().enumerate() {
        let expected = truth(48 + k);
        assert!(
            (point - expected).abs() < tolerance * expected,
            "step {}: forecast {} vs truth {}",
            k + 1,
            point,
            expected
        );
    }
}

#[test]
fn tree_regressor_recovers_trend_and_season() {
    let (frame, features) = engineered((0..48).map(truth).collect());
    let config = ForecastConfig::new(TARGET, features)
        .with_horizons(3, 6)
        .with_model_name(ModelKind::Tree)
        .with_blend_weights(0.5, 0.5)
        .with_num_bootstrap_samples(20)
        .with_lasso(20, 5)
        .with_seed(42);
    let (x, y) = parts(&frame, &config);

    let regression = RollingRegression::new(config.regression_config())
        .fit_predict(&x, &y)
        .unwrap();
    assert_eq!(regression.point.len(), 3);
    assert_eq!(regression.samples.len(), 20);
    assert_tracks_truth(&regression.point, 0.05);

    let model = RollingCombined::new(&frame, config).unwrap();
    let bundle = model.make_prediction(&x, &y).unwrap();
    assert_eq!(bundle.horizon(), 6);
    assert_eq!(bundle.num_samples(), 20);
    assert_tracks_truth(bundle.point(), 0.05);
}

#[test]
fn blended_paths_spread_like_reported_scale() {
    let (frame, features) = engineered((0..48).map(noisy).collect());
    let config = quick_config(features)
        .with_num_bootstrap_samples(100)
        .with_blend_weights(0.5, 0.5);
    let model = RollingCombined::new(&frame, config).unwrap();
    let bundle = model
        .make_prediction(model.features(), model.target())
        .unwrap();

    for k in 0..3 {
        let spread = population_std_dev(&bundle.step_samples(k).unwrap());
        let scale = bundle.scale()[k];
        assert!(
            (spread - scale).abs() < 0.2 * scale,
            "step {}: path spread {} vs scale {}",
            k + 1,
            spread,
            scale
        );
    }
}

#[test]
fn short_horizon_only_is_the_blend_itself() {
    let (frame, features) = engineered((0..30).map(truth).collect());
    let config = quick_config(features).with_horizons(3, 3);
    let (x, y) = parts(&frame, &config);

    let combined = RollingCombined::new(&frame, config.clone())
        .unwrap()
        .make_prediction(&x, &y)
        .unwrap();
    let regression = RollingRegression::new(config.regression_config())
        .fit_predict(&x, &y)
        .unwrap()
        .bundle()
        .unwrap();
    let mut structural = StructuralForecaster::new(config.structural_config());
    structural.fit(&y).unwrap();
    let expected = regression
        .blend(&structural.forecast(3, 6).unwrap(), 0.5, 0.5)
        .unwrap();
    assert_eq!(combined, expected);
}

#[test]
fn regression_diagnostics_name_selected_features() {
    let (frame, features) = engineered((0..48).map(truth).collect());
    let model = RollingCombined::new(&frame, quick_config(features.clone())).unwrap();
    let diagnostics = model.regression_diagnostics(0.2).unwrap();
    assert_eq!(diagnostics.len(), 3);
    for d in &diagnostics {
        assert!(!d.selected_features.is_empty());
        assert!(d.selected_features.iter().all(|name| features.contains(name)));
        assert!(d.train.r2 > 0.9, "horizon {} train r2 {}", d.horizon, d.train.r2);
        assert!(d.test.is_some());
    }
}

#[test]
fn bundle_shapes_follow_configuration() {
    let (frame, features) = engineered((0..30).map(truth).collect());
    for (short, total) in [(2, 5), (3, 3)] {
        let config = quick_config(features.clone()).with_horizons(short, total);
        let model = RollingCombined::new(&frame, config).unwrap();
        let bundle = model
            .make_prediction(model.features(), model.target())
            .unwrap();
        assert_eq!(bundle.point().len(), total);
        assert_eq!(bundle.scale().len(), total);
        assert_eq!(bundle.samples().len(), 6);
        assert!(bundle.samples().iter().all(|path| path.len() == total));
    }
}

#[test]
fn regression_only_weights_reduce_to_ensemble_output() {
    let (frame, features) = engineered((0..30).map(truth).collect());
    let config = quick_config(features).with_blend_weights(1.0, 0.0);
    let (x, y) = parts(&frame, &config);

    let combined = RollingCombined::new(&frame, config.clone())
        .unwrap()
        .make_prediction(&x, &y)
        .unwrap();
    let standalone = RollingRegression::new(config.regression_config())
        .fit_predict(&x, &y)
        .unwrap()
        .bundle()
        .unwrap();

    assert_eq!(&combined.point()[..3], standalone.point());
    assert_eq!(&combined.scale()[..3], standalone.scale());
    for (c, s) in combined.samples().iter().zip(standalone.samples()) {
        assert_eq!(&c[..3], s.as_slice());
    }
}

#[test]
fn structural_only_weights_reduce_to_structural_output() {
    let (frame, features) = engineered((0..30).map(truth).collect());
    let config = quick_config(features).with_blend_weights(0.0, 1.0);
    let (x, y) = parts(&frame, &config);

    let combined = RollingCombined::new(&frame, config.clone())
        .unwrap()
        .make_prediction(&x, &y)
        .unwrap();
    let mut structural = StructuralForecaster::new(config.structural_config());
    structural.fit(&y).unwrap();
    let standalone = structural.forecast(3, 6).unwrap();

    assert_eq!(&combined.point()[..3], standalone.point());
    assert_eq!(&combined.scale()[..3], standalone.scale());
    for (c, s) in combined.samples().iter().zip(standalone.samples()) {
        assert_eq!(&c[..3], s.as_slice());
    }
}

#[test]
fn equal_seeds_give_identical_bundles() {
    let (frame, features) = engineered((0..30).map(truth).collect());
    let model = RollingCombined::new(&frame, quick_config(features)).unwrap();
    let a = model.make_prediction(model.features(), model.target()).unwrap();
    let b = model.make_prediction(model.features(), model.target()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn flat_market_yields_neutral_regression_forecast() {
    let n = 30;
    let frame = Frame::new(months(n))
        .unwrap()
        .with_column(TARGET, vec![120.0; n])
        .unwrap()
        .with_column("count_list", (0..n).map(|t| 80.0 + t as f64).collect())
        .unwrap();
    let config = quick_config(vec!["count_list".to_string()]).with_blend_weights(1.0, 0.0);
    let (x, y) = parts(&frame, &config);

    let mut regression = RollingRegression::new(config.regression_config());
    let out = regression.fit_predict(&x, &y).unwrap();
    assert!(regression.models().iter().all(|m| m.is_uninformative()));
    assert_eq!(out.point, vec![120.0; 3]);

    let bundle = RollingCombined::new(&frame, config)
        .unwrap()
        .make_prediction(&x, &y)
        .unwrap();
    assert_eq!(&bundle.point()[..3], &[120.0, 120.0, 120.0]);
    assert_eq!(&bundle.scale()[..3], &[0.0, 0.0, 0.0]);

    let config = quick_config(vec!["count_list".to_string()])
        .with_blend_weights(1.0, 0.0)
        .with_lead_target(false);
    let out = RollingRegression::new(config.regression_config())
        .fit_predict(&x, &y)
        .unwrap();
    assert_eq!(out.point, vec![120.0; 3]);
    assert_eq!(out.scale, vec![0.0; 3]);
}

#[test]
fn missing_columns_fail_before_any_fitting() {
    let (frame, _) = engineered((0..30).map(truth).collect());
    let config = quick_config(vec!["count_list_lag1".to_string()]);
    assert_eq!(
        RollingCombined::new(&frame, config).unwrap_err(),
        ForecastError::MissingColumn("count_list_lag1".to_string())
    );

    let raw = Frame::new(months(5)).unwrap();
    assert!(matches!(
        FeatureEngineering::new(raw, &[TARGET]),
        Err(ForecastError::MissingColumn(_))
    ));
}

#[test]
fn rolling_windows_are_scored_on_available_rows() {
    let (frame, features) = engineered((0..36).map(truth).collect());
    let model = RollingCombined::new(&frame, quick_config(features)).unwrap();

    // windows of 6 rows: group 4 trains on 30 rows, group 5 on all 36
    let windows = model.rolling_prediction(4, 6).unwrap();
    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0].group, 4);
    assert_eq!(windows[0].origin, 30);
    assert_eq!(windows[0].bundle.horizon(), 6);
    assert_eq!(windows[0].metrics.map(|m| m.n), Some(6));
    assert_eq!(windows[1].origin, 36);
    assert!(windows[1].metrics.is_none());
}

#[test]
fn structural_history_must_cover_two_seasons() {
    let (frame, features) = engineered((0..20).map(truth).collect());
    let model = RollingCombined::new(&frame, quick_config(features)).unwrap();
    assert!(matches!(
        model.make_prediction(model.features(), model.target()),
        Err(ForecastError::InsufficientData { needed: 24, .. })
    ));
}
