use anyhow::Result;
use dagcalc::graph::Value;
use dagcalc::{App, Args, Page};

fn basic_args(calc: &str) -> Args {
    Args {
        calc: Some(calc.to_owned()),
        set: Vec::with_capacity(0),
        list: false,
        reload: false,
        vectorize: false,
        verbose: 1,
    }
}

fn with_edits(mut args: Args, edits: &[&str]) -> Args {
    args.set = edits.iter().map(|e| e.to_string()).collect();
    args
}

fn evaluate(args: Args) -> Result<Vec<Page>> {
    simple_logging::log_to_stderr(log::LevelFilter::Trace);
    let settings = args.try_into()?;
    App::new(settings).evaluate()
}

fn as_f64(v: Option<&Value>) -> Option<f64> {
    v.and_then(Value::as_f64)
}

fn floats(xs: &[f64]) -> Vec<Value> {
    xs.iter().copied().map(Value::Float).collect()
}

#[test]
fn test_simple() -> Result<()> {
    let pages = evaluate(with_edits(basic_args("simple"), &["a=2"]))?;
    assert_eq!(1, pages.len());
    assert_eq!("Result Calculator", pages[0].title);
    assert_eq!(Some(36.0), as_f64(pages[0].value("result")?));
    assert_eq!(None, pages[0].sequence("result")?);
    Ok(())
}

#[test]
fn test_reload_matches_incremental() -> Result<()> {
    let edits = ["a=3", "c=1"];
    let incremental = evaluate(with_edits(basic_args("simple"), &edits))?;
    let mut args = with_edits(basic_args("simple"), &edits);
    args.reload = true;
    let reloaded = evaluate(args)?;
    // b = 8, d = 5
    assert_eq!(Some(40.0), as_f64(incremental[0].value("result")?));
    assert_eq!(incremental[0].value("result")?, reloaded[0].value("result")?);
    Ok(())
}

#[test]
fn test_run_and_list() -> Result<()> {
    let mut args = basic_args("simple");
    args.calc = None;
    args.list = true;
    App::new(args.try_into()?).run()?;

    App::new(with_edits(basic_args("pricing"), &["max_partners=1000"]).try_into()?).run()?;
    Ok(())
}

#[test]
fn test_unknown_calculator() {
    let e = evaluate(basic_args("nope")).unwrap_err();
    assert!(matches!(
        e.downcast_ref::<dagcalc::catalog::Error>(),
        Some(dagcalc::catalog::Error::UnknownCalculator(_))
    ));
}

#[test]
fn test_bad_edits() {
    assert!(evaluate(with_edits(basic_args("simple"), &["a=1..3:3"])).is_err());
    assert!(evaluate(with_edits(basic_args("simple"), &["a=[1"])).is_err());
}

#[test]
fn test_edit_for_other_page_is_skipped() -> Result<()> {
    let pages = evaluate(with_edits(basic_args("fees"), &["tier=deep"]))?;
    let [summary, tiered, details] = &pages[..] else {
        panic!("expected three pages");
    };
    let expected = 19200.0 * 1.081;
    let close = |v: Option<f64>, x: f64| v.is_some_and(|v| (v - x).abs() < 1e-6);
    assert!(close(as_f64(summary.value("monthly_total")?), expected));
    assert!(close(as_f64(details.value("total_incl_vat")?), expected));
    assert!(close(as_f64(tiered.value("tiered_total")?), 28800.0 * 1.081));
    Ok(())
}

#[test]
fn test_vectorized() -> Result<()> {
    let mut args = with_edits(basic_args("simple"), &["a=0..4:5", "c=0"]);
    args.vectorize = true;
    let pages = evaluate(args)?;
    let page = &pages[0];
    assert_eq!(None, page.value("result")?);
    assert_eq!(Some(&floats(&[9.0; 5])), page.sequence("d")?);
    assert_eq!(
        Some(&floats(&[9.0, 18.0, 36.0, 72.0, 144.0])),
        page.sequence("result")?
    );
    Ok(())
}

#[test]
fn test_vectorized_mismatch() {
    let mut args = with_edits(basic_args("simple"), &["a=1,2,3"]);
    args.vectorize = true;
    // a has 3 values, c keeps the default 5.
    assert!(evaluate(args).is_err());
}

#[test]
fn test_metrics() -> Result<()> {
    let pages = evaluate(with_edits(basic_args("metrics"), &["threshold=0.75"]))?;
    // only 0.8 and 0.9 predicted positive:
    let counts: Value = [("tp", 2), ("tn", 3), ("fn", 2), ("fp", 0)].into_iter().collect();
    assert_eq!(Some(&counts), pages[0].value("confusion_count")?);
    assert_eq!(Some(3.0 / 7.0), as_f64(pages[0].value("classifier_score")?));

    let e = evaluate(with_edits(basic_args("metrics"), &["truth=1,0"])).unwrap_err();
    let misaligned = e.chain().any(|c| {
        matches!(
            c.downcast_ref::<dagcalc::metrics::Error>(),
            Some(dagcalc::metrics::Error::Misaligned { .. })
        )
    });
    assert!(misaligned);
    Ok(())
}
