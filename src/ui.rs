use colored::Colorize;
use std::fmt;

use graph::Value;
use util::Timer;

use crate::app::{Page, PageState};
use crate::settings::Settings;

/// All interactions with the text UI should go through this struct.
pub struct Ui {
    /// -v setting, displays extra text info to user
    pub verbose: bool,
    /// keeps track of time for each page
    timer: Timer,
}

impl Ui {
    pub fn new(settings: &Settings) -> Self {
        Self {
            verbose: settings.verbose > 0,
            timer: Timer::now(),
        }
    }

    pub fn start_timer(&mut self) {
        if self.verbose {
            self.timer.reset();
        }
    }

    pub fn print_elapsed(&self, label: &str) {
        if self.verbose {
            self.timer.log_elapsed(label);
        }
    }

    pub fn verbose_progress(&self, msg: &str) {
        if self.verbose {
            eprint!("{}... ", msg.magenta());
        }
    }

    pub fn done(&self) {
        if self.verbose {
            eprintln!("{}.", "done".green());
        }
    }

    pub fn print_catalog(&self, entries: &[(&str, &str)]) {
        for (name, about) in entries {
            println!("{:<12} {}", name.cyan(), about);
        }
    }

    pub fn print_page(&self, page: &Page) {
        print!("{page}");
    }
}

/// One line per node (and per key of map values), under the page title.
impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title.bold())?;
        for var in self.graph.order() {
            let name = self.graph.name(*var).cyan();
            let marker = if self.graph.is_root(*var) { "*" } else { " " };
            match &self.state {
                PageState::Scalar(asg) => match asg.get(*var) {
                    Some(Value::Map(map)) => {
                        for (key, value) in map {
                            writeln!(f, "{marker} {name}.{key} = {value}")?;
                        }
                    }
                    Some(value) => writeln!(f, "{marker} {name} = {value}")?,
                    None => writeln!(f, "{marker} {name} = {}", "?".red())?,
                },
                PageState::Vectorized(seqs) => match seqs.get(*var) {
                    Some(values) => {
                        writeln!(f, "{marker} {name} = {}", Value::List(values.clone()))?
                    }
                    None => writeln!(f, "{marker} {name} = {}", "?".red())?,
                },
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use eval::Evaluator;
    use graph::{FunctionNode, Graph};

    #[test]
    fn test_render_page() -> anyhow::Result<()> {
        let graph = Graph::new([FunctionNode::new("summary", |args| {
            let x = args.num("x")?;
            Ok([("low", Value::Float(x - 1.0)), ("high", Value::Float(x + 1.0))]
                .into_iter()
                .collect())
        })
        .param(graph::Param::float("x", 2.0))])?;
        let asg = Evaluator::new(&graph).infer_defaults()?;
        let page = Page {
            title: graph.title(),
            graph,
            state: PageState::Scalar(asg),
        };
        let text = page.to_string();
        assert!(text.contains("Summary Calculator"));
        assert!(text.contains("= 2\n"));
        assert!(text.contains(".high = 3\n"));
        assert!(text.contains(".low = 1\n"));
        Ok(())
    }
}
