use errors::EvalError;

/// Turns an evaluation result into text for the terminal or for embedding
/// into an HTML page.
#[derive(Debug, Default, Clone, Copy)]
pub struct Renderer {
    pub precision: Option<usize>,
    pub html: bool,
}

impl Renderer {
    pub fn render(&self, source: &str, result: &Result<f64, EvalError>) -> String {
        if self.html {
            let outcome = match result {
                Ok(value) => format!(
                    r#"<div class="result"><strong>Result:</strong> {}</div>"#,
                    self.format_value(*value)
                ),
                Err(e) => format!(
                    r#"<div class="error"><strong>Error:</strong> {}</div>"#,
                    escape_html(&e.to_string())
                ),
            };
            format!(r#"<div class="expression">{}</div>{}"#, escape_html(source), outcome)
        } else {
            match result {
                Ok(value) => self.format_value(*value),
                Err(e) => format!("error: {e}"),
            }
        }
    }

    fn format_value(&self, value: f64) -> String {
        // -0 prints as "-0"
        let value = if value == 0.0 { 0.0 } else { value };
        match self.precision {
            Some(precision) => format!("{value:.precision$}"),
            None => value.to_string(),
        }
    }
}

pub fn escape_html(unsafe_text: &str) -> String {
    let mut escaped = String::with_capacity(unsafe_text.len());
    for c in unsafe_text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            c => escaped.push(c),
        }
    }
    escaped
}
