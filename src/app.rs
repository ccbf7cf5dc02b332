use anyhow::{Context, Result};
use colored::Colorize;

use eval::{Assignment, Evaluator, Sequences, Sweep, VectorizedEvaluator};
use graph::{Graph, Value};

use crate::catalog::{self, Calculator};
use crate::settings::{self, Edit, EditValue, Settings};
use crate::ui::Ui;

/// Node values for one page, either single values or sequences.
#[derive(Debug)]
pub enum PageState {
    Scalar(Assignment),
    Vectorized(Sequences),
}

/// One evaluated page of a calculator.
#[derive(Debug)]
pub struct Page {
    pub title: String,
    pub graph: Graph,
    pub state: PageState,
}

impl Page {
    /// Value of `name`, if this page was evaluated in scalar mode.
    pub fn value(&self, name: &str) -> Result<Option<&Value>> {
        match &self.state {
            PageState::Scalar(asg) => asg.get_by_name(&self.graph, name),
            PageState::Vectorized(_) => Ok(None),
        }
    }

    /// Sequence bound to `name`, if this page was evaluated in vectorized mode.
    pub fn sequence(&self, name: &str) -> Result<Option<&Vec<Value>>> {
        match &self.state {
            PageState::Vectorized(seqs) => seqs.get_by_name(&self.graph, name),
            PageState::Scalar(_) => Ok(None),
        }
    }
}

/// This struct actually runs the command-line app.
pub struct App {
    /// Interpreted command line settings
    settings: Settings,
    /// User interface
    ui: Ui,
}

impl App {
    /// Create a new `App`.
    pub fn new(settings: Settings) -> Self {
        let ui = Ui::new(&settings);
        Self { settings, ui }
    }

    /// Run the app: list calculators, or evaluate one and print every page.
    pub fn run(mut self) -> Result<()> {
        if self.settings.list {
            self.ui.print_catalog(&catalog::ENTRIES);
            if self.settings.calc.is_none() {
                return Ok(());
            }
        }

        for page in self.evaluate()? {
            self.ui.print_page(&page);
        }
        Ok(())
    }

    /// Load the selected calculator, validate it, and evaluate each page.
    pub fn evaluate(&mut self) -> Result<Vec<Page>> {
        let name = self
            .settings
            .calc
            .as_deref()
            .ok_or(settings::Error::NoCalculatorSpecified)?;

        self.ui.verbose_progress("Loading calculator");
        let Calculator { pages, configs, .. } = catalog::load(name)?;
        graph::validate_all(&pages, &configs)
            .with_context(|| format!("while validating calculator {}", name.cyan()))?;
        self.ui.done();

        let mut out = Vec::with_capacity(pages.len());
        for graph in pages {
            let title = graph.title();
            self.ui.start_timer();
            let state = if self.settings.vectorize {
                PageState::Vectorized(self.evaluate_vectorized(&graph)?)
            } else {
                PageState::Scalar(self.evaluate_scalar(&graph)?)
            };
            self.ui.print_elapsed(&title);
            out.push(Page { title, graph, state });
        }
        Ok(out)
    }
}

// EVALUATION //////////////////
impl App {
    fn evaluate_scalar(&self, graph: &Graph) -> Result<Assignment> {
        let eval = Evaluator::new(graph);
        let mut asg = eval.infer_defaults()?;

        for edit in self.edits_for(graph) {
            let value = match &edit.value {
                EditValue::Value(v) => v.clone(),
                EditValue::Sweep(_) => {
                    return Err(settings::Error::SweepWithoutVectorize(edit.to_string()).into())
                }
            };
            let update = eval
                .on_change(&mut asg, &edit.name, value)
                .with_context(|| format!("while applying {}", edit.to_string().cyan()))?;
            log::debug!("{} recomputed {} nodes", edit, update.recomputed.len());
        }

        if self.settings.reload {
            eval.full_reload(&mut asg)?;
        }
        Ok(asg)
    }

    fn evaluate_vectorized(&self, graph: &Graph) -> Result<Sequences> {
        let eval = VectorizedEvaluator::new(graph);
        let mut seqs = eval.default_sequences();
        eval.reload(&mut seqs)?;

        for edit in self.edits_for(graph) {
            match &edit.value {
                EditValue::Sweep(sweep) => {
                    eval.bind_sweep(&mut seqs, &edit.name, sweep)?;
                }
                EditValue::Value(Value::List(items)) => {
                    eval.bind(&mut seqs, &edit.name, items.clone())?;
                }
                EditValue::Value(v) => {
                    let len = seqs
                        .get_by_name(graph, &edit.name)?
                        .map_or(Sweep::default().num, Vec::len);
                    eval.bind(&mut seqs, &edit.name, vec![v.clone(); len])?;
                }
            }
            eval.on_change(&mut seqs, &edit.name)
                .with_context(|| format!("while applying {}", edit.to_string().cyan()))?;
        }

        if self.settings.reload {
            eval.reload(&mut seqs)?;
        }
        Ok(seqs)
    }

    /// Edits that name a node on this page; the rest belong to other pages.
    fn edits_for<'s>(&'s self, graph: &'s Graph) -> impl Iterator<Item = &'s Edit> + 's {
        self.settings.edits.iter().filter(move |edit| {
            let found = graph.find(&edit.name).is_some();
            if !found {
                log::info!("{} not on page {}, skipping", edit.name.cyan(), graph.title());
            }
            found
        })
    }
}
