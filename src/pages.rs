//! Server-rendered HTML for the two front-ends.
//!
//! The explorer (`/`) shows the form, the result and the chart panel. The
//! basic front-end (`/basic`) shows only the form and the result. Charts are
//! drawn in the browser from the `/api/charts/*` JSON.

use std::fmt::Write;

use crate::artifacts::Artifacts;
use crate::charts::PanelOptions;
use crate::form::{Control, FormSpec};
use crate::prediction::{PredictionRequest, PredictionResult};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontEnd {
    Explorer,
    Basic,
}

impl FrontEnd {
    pub fn base_path(&self) -> &'static str {
        match self {
            Self::Explorer => "",
            Self::Basic => "/basic",
        }
    }

    fn heading(&self) -> &'static str {
        match self {
            Self::Explorer => "\u{1F3E5} Medical Insurance Charges Prediction",
            Self::Basic => "Medical Insurance Charges Prediction",
        }
    }

    fn subheading(&self) -> &'static str {
        match self {
            Self::Explorer => "Fill in your details:",
            Self::Basic => "User Input Parameters",
        }
    }

    fn result_label(&self) -> &'static str {
        match self {
            Self::Explorer => "Estimated Insurance Charges:",
            Self::Basic => "Predicted Charges:",
        }
    }

    fn button_label(&self) -> &'static str {
        match self {
            Self::Explorer => "\u{1F52E} Predict Charges",
            Self::Basic => "Predict",
        }
    }
}

/// What the output region shows
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing submitted yet
    Idle,
    Predicted(PredictionResult),
    Failed(String),
}

/// Render a full page; `values` are the submitted form values, `None` for defaults
pub fn render_page(
    front_end: FrontEnd,
    artifacts: &Artifacts,
    values: Option<&PredictionRequest>,
    outcome: &Outcome,
) -> String {
    let mut html = String::with_capacity(8 * 1024);
    page_head(&mut html, front_end);
    let _ = write!(html, "<h1>{}</h1>", escape_html(front_end.heading()));

    let dataset = match artifacts.dataset() {
        Ok(dataset) => dataset,
        Err(failure) => {
            let _ = write!(
                html,
                "<div class=\"alert\" id=\"data-error\">Failed to load data. Please check your CSV file path or content.<br><small>{}</small></div>",
                escape_html(&failure.to_string())
            );
            html.push_str("</main></body></html>");
            return html;
        }
    };

    let form = FormSpec::from_dataset(dataset);
    let defaults = form.defaults();
    let values = values.unwrap_or(&defaults);
    let model_ready = artifacts.model().is_ok();

    let _ = write!(html, "<h2>{}</h2>", escape_html(front_end.subheading()));
    if let Err(failure) = artifacts.model() {
        let _ = write!(
            html,
            "<div class=\"alert\" id=\"model-error\">{}</div>",
            escape_html(&failure.to_string())
        );
    }

    let _ = write!(
        html,
        "<form method=\"post\" action=\"{}/predict\"><div class=\"row\">",
        front_end.base_path()
    );
    for column in &form.columns {
        html.push_str("<div class=\"col\">");
        for control in column {
            render_control(&mut html, control, values);
        }
        html.push_str("</div>");
    }
    let _ = write!(
        html,
        "</div><button type=\"submit\" id=\"predict-button\"{}>{}</button></form>",
        if model_ready { "" } else { " disabled" },
        escape_html(front_end.button_label())
    );

    html.push_str("<div id=\"prediction-output\">");
    match outcome {
        Outcome::Idle => {}
        Outcome::Predicted(result) => {
            let _ = write!(
                html,
                "<div class=\"prediction-box\">{} <span class=\"amount\">{}</span></div>",
                escape_html(front_end.result_label()),
                escape_html(&result.display())
            );
        }
        Outcome::Failed(message) => {
            let _ = write!(html, "<div class=\"alert\">{}</div>", escape_html(message));
        }
    }
    html.push_str("</div>");

    if front_end == FrontEnd::Explorer {
        render_panel(&mut html, &PanelOptions::from_dataset(dataset));
    }

    html.push_str("</main></body></html>");
    html
}

fn page_head(html: &mut String, front_end: FrontEnd) {
    html.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">");
    html.push_str("<title>Medical Insurance Charges Prediction</title>");
    html.push_str(STYLE);
    if front_end == FrontEnd::Explorer {
        let _ = write!(html, "<script src=\"{}\"></script>", PLOTLY_CDN);
    }
    html.push_str("</head><body><main class=\"container\">");
}

fn render_control(html: &mut String, control: &Control, values: &PredictionRequest) {
    match control {
        Control::Slider(slider) => {
            let value = match slider.name {
                "age" => values.age.to_string(),
                "bmi" => format!("{:.1}", values.bmi),
                "children" => values.children.to_string(),
                _ => slider.default.to_string(),
            };
            let _ = write!(
                html,
                "<label for=\"{name}\">{label}</label><div class=\"slider\"><input type=\"range\" id=\"{name}\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\" oninput=\"this.nextElementSibling.value=this.value\"><output>{value}</output></div>",
                name = slider.name,
                label = escape_html(slider.label),
                min = slider.min,
                max = slider.max,
                step = slider.step,
                value = value,
            );
        }
        Control::Selector(selector) => {
            let current = match selector.name {
                "sex" => values.sex.as_str(),
                "smoker" => values.smoker.as_str(),
                "region" => values.region.as_str(),
                _ => "",
            };
            let _ = write!(
                html,
                "<label for=\"{name}\">{label}</label><select id=\"{name}\" name=\"{name}\">",
                name = selector.name,
                label = escape_html(selector.label),
            );
            for option in &selector.options {
                let _ = write!(
                    html,
                    "<option value=\"{v}\"{sel}>{v}</option>",
                    v = escape_html(option),
                    sel = if option == current { " selected" } else { "" }
                );
            }
            html.push_str("</select>");
        }
    }
}

fn render_panel(html: &mut String, options: &PanelOptions) {
    let defaults = &options.defaults;

    html.push_str("<hr><h3>\u{1F4CA} Interactive Data Visualizations</h3>");
    html.push_str("<details id=\"visualizations\"><summary>Click to select features and show charts</summary>");

    html.push_str("<h4>Univariate Analysis</h4>");
    select(html, "uni-col", "Select numerical column for univariate chart:", &options.numeric_columns, defaults.univariate.as_deref());
    html.push_str("<div class=\"chart\" id=\"chart-univariate\"></div>");

    html.push_str("<h4>Bivariate Analysis</h4>");
    select(html, "bi-x", "Select X-axis column:", &options.all_columns, defaults.x.as_deref());
    select(html, "bi-y", "Select Y-axis column:", &options.all_columns, defaults.y.as_deref());
    select(html, "bi-color", "Select categorical column for color:", &options.categorical_columns, defaults.color.as_deref());
    html.push_str("<div class=\"chart\" id=\"chart-bivariate\"></div>");

    html.push_str("<h4>Multivariate Analysis</h4>");
    html.push_str("<label for=\"multi-cols\">Select multiple columns for scatter matrix:</label><select id=\"multi-cols\" multiple>");
    for column in &options.numeric_columns {
        let _ = write!(
            html,
            "<option value=\"{v}\"{sel}>{v}</option>",
            v = escape_html(column),
            sel = if defaults.multivariate.contains(column) { " selected" } else { "" }
        );
    }
    html.push_str("</select>");
    select(html, "multi-color", "Select categorical column for color coding:", &options.categorical_columns, defaults.color.as_deref());
    html.push_str("<div class=\"chart\" id=\"chart-multivariate\"></div>");

    html.push_str("</details>");
    html.push_str(PANEL_SCRIPT);
}

fn select(html: &mut String, id: &str, label: &str, choices: &[String], selected: Option<&str>) {
    let _ = write!(
        html,
        "<label for=\"{id}\">{label}</label><select id=\"{id}\">",
        id = id,
        label = escape_html(label)
    );
    for choice in choices {
        let _ = write!(
            html,
            "<option value=\"{v}\"{sel}>{v}</option>",
            v = escape_html(choice),
            sel = if Some(choice.as_str()) == selected { " selected" } else { "" }
        );
    }
    html.push_str("</select>");
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"<style>
body { background-color: #F4F6F7; font-family: sans-serif; margin: 0; }
.container { max-width: 960px; margin: 0 auto; padding: 20px; }
h1 { font-size: 40px; color: #2E86C1; text-align: center; margin-bottom: 20px; }
h2 { font-size: 22px; color: #2980B9; margin-bottom: 20px; }
.row { display: flex; gap: 24px; }
.col { flex: 1; display: flex; flex-direction: column; }
label { margin-top: 20px; }
.slider { display: flex; align-items: center; gap: 8px; }
.slider input { flex: 1; }
select { padding: 4px; }
button { margin-top: 30px; width: 100%; background-color: #3498DB; color: white; border: 0; border-radius: 8px; padding: 10px 20px; font-size: 18px; }
button:hover { background-color: #5DADE2; }
button:disabled { background-color: #AAB7B8; }
.prediction-box { background-color: #D6EAF8; padding: 20px; border-radius: 10px; text-align: center; font-size: 28px; font-weight: bold; color: #1A5276; margin-top: 20px; }
.amount { color: #154360; }
.alert { background-color: #FADBD8; color: #78281F; padding: 12px; border-radius: 6px; margin-top: 20px; }
.chart { min-height: 420px; }
</style>"#;

const PANEL_SCRIPT: &str = r#"<script>
(function () {
  const $ = (id) => document.getElementById(id);
  async function draw(target, url, figure) {
    const el = $(target);
    const res = await fetch(url);
    const body = await res.json();
    if (!res.ok) { Plotly.purge(el); el.textContent = body.error.message; return; }
    if (body === null) { Plotly.purge(el); el.textContent = ""; return; }
    el.textContent = "";
    Plotly.react(el, ...figure(body));
  }
  function univariate() {
    const col = $("uni-col").value;
    draw("chart-univariate", "/api/charts/univariate?column=" + encodeURIComponent(col), (c) => [[
      { type: "bar", x: c.bins.map((b) => (b.start + b.end) / 2), y: c.bins.map((b) => b.count),
        width: c.bins.map((b) => b.end - b.start), name: c.column, yaxis: "y" },
      ...(c.summary ? [{ type: "box", x: [c.summary.lower_whisker, c.summary.q1, c.summary.median, c.summary.q3, c.summary.upper_whisker].concat(c.summary.outliers),
        name: "", yaxis: "y2", boxpoints: false }] : []),
    ], { title: c.title, xaxis: { title: c.column }, yaxis: { domain: [0, 0.8] }, yaxis2: { domain: [0.82, 1], showticklabels: false }, showlegend: false }]);
  }
  function bivariate() {
    const q = new URLSearchParams({ x: $("bi-x").value, y: $("bi-y").value, color: $("bi-color").value });
    draw("chart-bivariate", "/api/charts/bivariate?" + q, (c) => [
      c.groups.map((g) => ({ type: "scatter", mode: "markers", x: g.x, y: g.y, name: g.name })),
      { title: c.title, xaxis: { title: c.x }, yaxis: { title: c.y }, legend: { title: { text: c.color } } },
    ]);
  }
  function multivariate() {
    const cols = Array.from($("multi-cols").selectedOptions).map((o) => o.value);
    const q = new URLSearchParams({ columns: cols.join(","), color: $("multi-color").value });
    draw("chart-multivariate", "/api/charts/multivariate?" + q, (c) => [
      c.groups.map((g) => ({ type: "splom", name: g.name,
        dimensions: c.dimensions.map((d, i) => ({ label: d, values: g.values[i] })) })),
      { title: c.title, height: 600 },
    ]);
  }
  $("uni-col").addEventListener("change", univariate);
  ["bi-x", "bi-y", "bi-color"].forEach((id) => $(id).addEventListener("change", bivariate));
  ["multi-cols", "multi-color"].forEach((id) => $(id).addEventListener("change", multivariate));
  univariate(); bivariate(); multivariate();
})();
</script>"#;
