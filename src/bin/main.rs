use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use form_core::core::presenter::{
    cancer_type_display, field_label, submit_label, Emphasis, ResultView,
};
use form_core::core::resolver::{resolve, ControlSpec};
use form_core::{Config, FormSession, HttpPredictionClient};
use std::io::{self, stdin, stdout, Write};
use std::time::Duration;

const RESPONSE_WAIT: Duration = Duration::from_secs(15);

type Session = FormSession<HttpPredictionClient>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let config = Config::from_env()?;
    log::info!("using prediction service at {}", config.api_base_url);

    let mut session = FormSession::new(HttpPredictionClient::new(config));
    session.request_cancer_types();
    session.wait(RESPONSE_WAIT);

    let mut notice: Option<String> = None;

    loop {
        session.poll();
        print_ui(&session, notice.take())?;

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        let cmd = input.trim();

        match cmd {
            "exit" => break,
            "" => {}
            "submit" => notice = submit(&mut session),
            s if s.starts_with(":f") => notice = answer_by_index(&mut session, &s[2..]),
            s if s.starts_with(':') && s.len() > 1 => {
                // Select cancer type :1, :2 etc
                match s[1..].parse::<usize>() {
                    Ok(n) if n > 0 && n <= session.state().cancer_types().len() => {
                        let chosen = session.state().cancer_types()[n - 1].clone();
                        session.request_schema(chosen);
                        session.wait(RESPONSE_WAIT);
                    }
                    _ => notice = Some(format!("No cancer type '{}'", &s[1..])),
                }
            }
            s if s.starts_with("set ") => {
                let rest = s["set ".len()..].trim();
                notice = match rest.split_once(' ') {
                    Some((field, value)) => answer(&mut session, field, value),
                    None => Some("Usage: set <field> <value>".to_string()),
                };
            }
            other => notice = Some(format!("Unknown command '{other}'")),
        }
    }
    Ok(())
}

fn answer_by_index(session: &mut Session, rest: &str) -> Option<String> {
    let (index, value) = match rest.split_once(' ') {
        Some((i, v)) => (i, v),
        None => return Some("Usage: :f<N> <value>".to_string()),
    };
    let field = index
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| session.state().schema().entries().get(i))
        .map(|e| e.field.clone());
    match field {
        Some(field) => answer(session, &field, value),
        None => Some(format!("No field {index}")),
    }
}

fn answer(session: &mut Session, field: &str, value: &str) -> Option<String> {
    let description = session.state().schema().description(field).unwrap_or("");
    let control = resolve(field, description);
    match control.check(value) {
        Ok(()) => {
            session.answer(field, value.trim());
            None
        }
        Err(rejection) => Some(format!("{}: {rejection}", field_label(field))),
    }
}

fn submit(session: &mut Session) -> Option<String> {
    let missing = session.state().missing_fields();
    if !missing.is_empty() {
        let labels: Vec<String> = missing.iter().map(|f| field_label(f)).collect();
        return Some(format!("Please fill in: {}", labels.join(", ")));
    }
    match session.request_prediction() {
        Ok(()) => {
            session.wait(RESPONSE_WAIT);
            None
        }
        Err(e) => Some(format!("Cannot submit: {e}")),
    }
}

fn print_ui(session: &Session, notice: Option<String>) -> io::Result<()> {
    let state = session.state();
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    writeln!(out, "{}", "Cancer Metastasis Risk Prediction".bold())?;
    writeln!(out, "---------------------------------------------------------------")?;
    writeln!(out, "Select a type with ':1', ':2'. Answer with ':f1 <value>' or 'set <field> <value>'.")?;
    writeln!(out, "'submit' to predict, 'exit' to quit.\n")?;

    if let Some(error) = state.error() {
        writeln!(out, "{}\n", format!(" {error} ").white().on_red())?;
    }

    writeln!(out, "Select Cancer Type")?;
    for (i, cancer_type) in state.cancer_types().iter().enumerate() {
        let marker = if state.selected() == Some(cancer_type) { '*' } else { ' ' };
        writeln!(out, " {marker}:{}: {}", i + 1, cancer_type_display(cancer_type))?;
    }

    if state.selected().is_some() && !state.schema().is_empty() {
        writeln!(out, "\nPatient Information")?;
        for (i, (control, description)) in state.controls().iter().enumerate() {
            let field = control.field();
            let value = state.answers().get(field).map(String::as_str).unwrap_or("");
            writeln!(out, "  :f{}: {} = [{}]", i + 1, field_label(field).bold(), value)?;
            writeln!(out, "        {}", describe_control(control).dim())?;
            writeln!(out, "        {}", (*description).dim())?;
        }
        writeln!(out, "\n  [{}]", submit_label(state.is_submitting()))?;
    }

    if let Some(prediction) = state.prediction() {
        let view = ResultView::new(prediction);
        writeln!(out, "\nPrediction Results")?;
        for model in &view.models {
            writeln!(out, "  {}", model.title.bold())?;
            writeln!(out, "    Metastasis Probability: {}", model.metastasis)?;
            writeln!(out, "    No Metastasis Probability: {}", model.no_metastasis)?;
            let label = match model.emphasis {
                Emphasis::Alert => model.risk_label.as_str().red().bold(),
                Emphasis::Calm => model.risk_label.as_str().green().bold(),
            };
            writeln!(out, "    Risk Level: {label}")?;
        }
        writeln!(out, "  {}", view.generated_at.as_str().dim())?;
    }

    if let Some(notice) = notice {
        writeln!(out, "\n{}", notice.yellow())?;
    }
    write!(out, "\n> ")?;
    out.flush()
}

fn describe_control(control: &ControlSpec) -> String {
    match control {
        ControlSpec::FixedEnum { options, .. } | ControlSpec::DescribedEnum { options, .. } => {
            format!("{}: {}", control.prompt(), options.join(" | "))
        }
        ControlSpec::NumericRange { bounds, .. } => {
            let min = bounds.min.map_or("-".to_string(), |m| m.to_string());
            let max = bounds.max.map_or("-".to_string(), |m| m.to_string());
            format!("{} (min {min}, max {max}, step {})", control.prompt(), bounds.step)
        }
        ControlSpec::FreeText { .. } => control.prompt(),
    }
}
