//! Interface de terminal do jobboard — spinners e saída colorida.
//!
//! Usa as crates `indicatif` para spinners de progresso e `console` para
//! estilização com cores. O [`TerminalView`] implementa [`BoardView`]
//! imprimindo cada lote de vagas conforme chega.

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::board::{BoardView, Resource};
use crate::format::format_unix_time;
use crate::hn::Job;

/// Formata uma vaga em duas linhas sem estilo: título (com link) e metadados.
pub fn format_job(job: &Job) -> (String, String) {
    let title = match job.url.as_deref() {
        Some(url) if !url.is_empty() => format!("{} <{url}>", job.title),
        _ => job.title.clone(),
    };
    let metadata = format!("By {} - {}", job.by, format_unix_time(job.time));
    (title, metadata)
}

/// Saída do board no terminal.
pub struct TerminalView {
    // Spinner ativo enquanto alguma consulta está em andamento.
    spinner: Option<ProgressBar>,
    // Quantidade de vagas já impressas, usada na numeração.
    rendered: usize,
    load_more: bool,
    bold: Style,
    dim: Style,
    red: Style,
}

impl TerminalView {
    pub fn new() -> Self {
        Self {
            spinner: None,
            rendered: 0,
            load_more: false,
            bold: Style::new().bold(),
            dim: Style::new().dim(),
            red: Style::new().red().bold(),
        }
    }

    /// Imprime o cabeçalho da listagem.
    pub fn heading(&self) {
        println!("{}", self.bold.apply_to("Hacker News Job Board"));
        println!();
    }

    /// Indica se o último lote deixou mais vagas a carregar.
    pub fn can_load_more(&self) -> bool {
        self.load_more
    }

    pub fn rendered(&self) -> usize {
        self.rendered
    }

    fn start_spinner(&mut self, message: &str) {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(pb);
    }

    fn stop_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardView for TerminalView {
    fn set_loading(&mut self, resource: Resource, loading: bool) {
        if loading {
            let message = match resource {
                Resource::JobIds => "Fetching job list...",
                Resource::JobDetails => "Fetching job details...",
            };
            self.start_spinner(message);
        } else {
            self.stop_spinner();
        }
    }

    fn render_jobs(&mut self, jobs: &[Job]) {
        for job in jobs {
            self.rendered += 1;
            let (title, metadata) = format_job(job);
            println!("{:>3}. {}", self.rendered, self.bold.apply_to(title));
            println!("     {}", self.dim.apply_to(metadata));
        }
    }

    fn show_error(&mut self, message: &str) {
        self.stop_spinner();
        eprintln!("  {} {message}", self.red.apply_to("✗"));
    }

    fn set_load_more(&mut self, enabled: bool) {
        self.load_more = enabled;
    }
}
