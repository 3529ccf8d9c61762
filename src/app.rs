#![cfg(not(tarpaulin_include))]

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use chrono::Local;
use handlebars::{Handlebars, TemplateError};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::downloader;
use crate::editor::{self, CellEdit, Confirmation, DeleteOutcome, EditReport, RecordEditor};
use crate::error::{PlotError, StoreError};
use crate::graph::{self, GraphOptions, PlotKind, PlotSpec};
use crate::performance;
use crate::table::Table;
use crate::workbook::{SheetYear, Workbook, WorkbookStore};

pub struct AppState {
    store: WorkbookStore,
    graph: GraphOptions,
    templates: Handlebars<'static>,
}

impl AppState {
    pub fn new(store: WorkbookStore, graph: GraphOptions) -> Result<Self, TemplateError> {
        Ok(AppState {
            store,
            graph,
            templates: templates()?,
        })
    }
}

fn templates() -> Result<Handlebars<'static>, TemplateError> {
    let mut hb = Handlebars::new();
    hb.register_partial("table", include_str!("./templates/table.hbs"))?;
    hb.register_partial("sheet_picker", include_str!("./templates/sheet_picker.hbs"))?;
    hb.register_template_string("layout", include_str!("./templates/layout.hbs"))?;
    hb.register_template_string("view", include_str!("./templates/view.hbs"))?;
    hb.register_template_string("create", include_str!("./templates/create.hbs"))?;
    hb.register_template_string("update", include_str!("./templates/update.hbs"))?;
    hb.register_template_string("delete", include_str!("./templates/delete.hbs"))?;
    hb.register_template_string("display", include_str!("./templates/display.hbs"))?;
    hb.register_template_string("plot", include_str!("./templates/plot.hbs"))?;
    Ok(hb)
}

/// Sidebar entries; the selected one decides what the page shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    View(SheetYear),
    Create,
    Update,
    Delete,
    Display,
    Plot,
}

impl Action {
    pub const SIDEBAR: [Action; 8] = [
        Action::View(SheetYear::Y2024),
        Action::View(SheetYear::Y2023),
        Action::View(SheetYear::Y2022),
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Display,
        Action::Plot,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Action::View(year) => year.as_str(),
            Action::Create => "Create",
            Action::Update => "Update",
            Action::Delete => "Delete",
            Action::Display => "Display",
            Action::Plot => "Plot",
        }
    }

    pub fn href(&self) -> String {
        match self {
            Action::View(year) => format!("/view/{}", year),
            other => format!("/{}", other.label().to_lowercase()),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
struct Notice {
    level: &'static str,
    text: String,
}

impl Notice {
    fn success(text: impl Into<String>) -> Self {
        Notice {
            level: "success",
            text: text.into(),
        }
    }

    fn info(text: impl Into<String>) -> Self {
        Notice {
            level: "info",
            text: text.into(),
        }
    }

    fn warning(text: impl Into<String>) -> Self {
        Notice {
            level: "warning",
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Notice {
            level: "error",
            text: text.into(),
        }
    }
}

#[derive(Deserialize, Default)]
struct SheetQuery {
    sheet: Option<String>,
}

#[derive(Deserialize, Default)]
struct EvaluateQuery {
    played: Option<String>,
    won: Option<String>,
}

#[derive(Deserialize, Default)]
struct UpdateQuery {
    sheet: Option<String>,
    columns: Option<String>,
}

#[derive(Deserialize, Default)]
struct DeleteQuery {
    sheet: Option<String>,
    name: Option<String>,
}

#[derive(Deserialize)]
struct DeleteForm {
    sheet: String,
    name: String,
    confirm: Option<String>,
}

#[derive(Deserialize, Default)]
struct PlotQuery {
    sheet: Option<String>,
    kind: Option<String>,
    column: Option<String>,
    x: Option<String>,
    y: Option<String>,
}

/// Build the router over shared application state
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/view/2024") }))
        .route("/view/:sheet", get(view_sheet))
        .route("/create", get(create_form).post(create_record))
        .route("/update", get(update_form).post(update_records))
        .route("/delete", get(delete_form).post(delete_records))
        .route("/display", get(display_sheet))
        .route("/plot", get(plot_page))
        .route("/plot.png", get(plot_image))
        .route("/api/sheets/:sheet", get(sheet_json))
        .route("/download/:sheet", get(download_csv))
        .with_state(state)
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = WorkbookStore::new(&config.workbook);
    let graph = GraphOptions {
        width: config.plot_width,
        height: config.plot_height,
    };
    let app = router(Arc::new(AppState::new(store, graph)?));

    let listener = TcpListener::bind(config.bind).await?;
    info!(
        "Serving {} on http://{}",
        config.workbook.display(),
        config.bind
    );
    axum::serve(listener, app).await?;

    Ok(())
}

fn render_page(
    state: &AppState,
    action: Action,
    notices: Vec<Notice>,
    template: Option<&str>,
    ctx: &Value,
) -> Response {
    let body = match template.map(|t| state.templates.render(t, ctx)) {
        Some(Ok(body)) => body,
        Some(Err(e)) => {
            error!("Rendering {} failed: {}", action.label(), e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response();
        }
        None => String::new(),
    };

    let nav: Vec<Value> = Action::SIDEBAR
        .iter()
        .map(|a| json!({ "label": a.label(), "href": a.href(), "active": *a == action }))
        .collect();

    let layout = json!({
        "title": action.label(),
        "nav": nav,
        "notices": notices,
        "body": body,
        "now": Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    });

    match state.templates.render("layout", &layout) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Rendering layout failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

/// Runs workbook I/O and chart rendering off the async worker threads.
async fn blocking<F>(state: Arc<AppState>, page: F) -> Response
where
    F: FnOnce(&AppState) -> Response + Send + 'static,
{
    match tokio::task::spawn_blocking(move || page(state.as_ref())).await {
        Ok(response) => response,
        Err(e) => {
            error!("Request task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Request failed").into_response()
        }
    }
}

/// Reads the three yearly sheets, or renders the load failure inline.
fn load_years(state: &AppState, action: Action) -> Result<Workbook, Response> {
    state.store.load_years().map_err(|e| {
        error!("Loading {} failed: {}", state.store.path().display(), e);
        render_page(
            state,
            action,
            vec![Notice::error(e.user_message())],
            None,
            &json!({}),
        )
    })
}

fn pick_sheet(raw: Option<&str>, notices: &mut Vec<Notice>) -> SheetYear {
    match raw.filter(|s| !s.is_empty()) {
        None => SheetYear::default(),
        Some(s) => s.parse().unwrap_or_else(|e: String| {
            notices.push(Notice::warning(e));
            SheetYear::default()
        }),
    }
}

fn table_ctx(table: &Table) -> Value {
    json!({ "columns": table.columns(), "rows": table.display_rows() })
}

fn sheet_options(selected: SheetYear, label: &str) -> (Vec<Value>, String) {
    let sheets = SheetYear::ALL
        .iter()
        .map(|y| json!({ "name": y.as_str(), "selected": *y == selected }))
        .collect();
    (sheets, label.to_string())
}

fn take_table(book: &mut Workbook, sheet: SheetYear) -> Table {
    book.take(sheet.as_str()).unwrap_or_default()
}

fn report_notices(report: &EditReport, notices: &mut Vec<Notice>) {
    notices.extend(report.warnings.iter().map(|w| Notice::warning(w.to_string())));
    if let Some(saved) = &report.saved {
        notices.push(save_notice(saved));
    }
}

fn save_notice(saved: &Result<(), StoreError>) -> Notice {
    match saved {
        Ok(()) => Notice::success("Changes saved successfully!"),
        Err(e) => Notice::error(e.user_message()),
    }
}

fn parse_number(raw: Option<&str>, label: &str, notices: &mut Vec<Notice>) -> f64 {
    let raw = raw.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return 0.0;
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => {
            notices.push(Notice::warning(format!("'{}' is not a valid number of matches {}.", raw, label)));
            0.0
        }
    }
}

async fn view_sheet(
    Path(sheet): Path<String>,
    Query(params): Query<EvaluateQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    blocking(state, move |state| view_sheet_page(state, sheet, params)).await
}

fn view_sheet_page(state: &AppState, sheet: String, params: EvaluateQuery) -> Response {
    let Ok(year) = sheet.parse::<SheetYear>() else {
        let action = Action::View(SheetYear::default());
        let notices = vec![Notice::error(format!("Unknown sheet: {}", sheet))];
        return render_page(state, action, notices, None, &json!({}));
    };
    let action = Action::View(year);
    let mut book = match load_years(state, action) {
        Ok(book) => book,
        Err(resp) => return resp,
    };
    let table = take_table(&mut book, year);

    let mut notices = Vec::new();
    let played = parse_number(params.played.as_deref(), "played", &mut notices);
    let won = parse_number(params.won.as_deref(), "won", &mut notices);
    if played < 0.0 || won < 0.0 {
        notices.push(Notice::warning("Match counts should not be negative."));
    }
    if won > played && played > 0.0 {
        notices.push(Notice::warning("Matches won exceeds matches played."));
    }

    let feedback = performance::evaluate(played, won);
    let ctx = json!({
        "sheet": year.as_str(),
        "table": table_ctx(&table),
        "played": played,
        "won": won,
        "feedback": { "label": feedback.label(), "message": feedback.message() },
    });
    render_page(state, action, notices, Some("view"), &ctx)
}

fn create_ctx(year: SheetYear, table: &Table, updated: bool) -> Value {
    let (sheets, picker_label) = sheet_options(year, "Select sheet to add data:");
    let fields: Vec<Value> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, c)| json!({ "column": c, "name": format!("field_{}", i) }))
        .collect();
    json!({
        "sheet": year.as_str(),
        "sheets": sheets,
        "picker_label": picker_label,
        "fields": fields,
        "updated": updated,
        "table": table_ctx(table),
    })
}

async fn create_form(Query(params): Query<SheetQuery>, State(state): State<Arc<AppState>>) -> Response {
    blocking(state, move |state| create_form_page(state, params)).await
}

fn create_form_page(state: &AppState, params: SheetQuery) -> Response {
    let mut notices = Vec::new();
    let year = pick_sheet(params.sheet.as_deref(), &mut notices);
    let mut book = match load_years(state, Action::Create) {
        Ok(book) => book,
        Err(resp) => return resp,
    };
    let table = take_table(&mut book, year);
    render_page(state, Action::Create, notices, Some("create"), &create_ctx(year, &table, false))
}

async fn create_record(
    State(state): State<Arc<AppState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    blocking(state, move |state| create_record_page(state, form)).await
}

fn create_record_page(state: &AppState, form: HashMap<String, String>) -> Response {
    let mut notices = Vec::new();
    let year = pick_sheet(form.get("sheet").map(String::as_str), &mut notices);
    let mut book = match load_years(state, Action::Create) {
        Ok(book) => book,
        Err(resp) => return resp,
    };
    let mut table = take_table(&mut book, year);

    let inputs: Vec<String> = (0..table.columns().len())
        .map(|i| form.get(&format!("field_{}", i)).cloned().unwrap_or_default())
        .collect();

    let report = RecordEditor::new(&state.store, year.as_str()).create(&mut table, &inputs);
    report_notices(&report, &mut notices);
    render_page(state, Action::Create, notices, Some("create"), &create_ctx(year, &table, true))
}

fn update_ctx(year: SheetYear, table: &Table, columns: &str, notices: &mut Vec<Notice>) -> Value {
    let (sheets, picker_label) = sheet_options(year, "Select sheet to update data:");
    let mut edits = Vec::new();
    for (i, column) in editor::parse_column_list(columns).iter().enumerate() {
        if table.column_index(column).is_none() {
            notices.push(Notice::warning(format!("Column '{}' not found. Skipping...", column)));
            continue;
        }
        edits.push(json!({
            "column": column,
            "row_field": format!("row_{}", i),
            "value_field": format!("value_{}", i),
        }));
    }
    json!({
        "sheet": year.as_str(),
        "sheets": sheets,
        "picker_label": picker_label,
        "columns": columns,
        "edits": edits,
        "table": table_ctx(table),
    })
}

async fn update_form(Query(params): Query<UpdateQuery>, State(state): State<Arc<AppState>>) -> Response {
    blocking(state, move |state| update_form_page(state, params)).await
}

fn update_form_page(state: &AppState, params: UpdateQuery) -> Response {
    let mut notices = Vec::new();
    let year = pick_sheet(params.sheet.as_deref(), &mut notices);
    let mut book = match load_years(state, Action::Update) {
        Ok(book) => book,
        Err(resp) => return resp,
    };
    let table = take_table(&mut book, year);
    let columns = params.columns.unwrap_or_default();
    let ctx = update_ctx(year, &table, &columns, &mut notices);
    render_page(state, Action::Update, notices, Some("update"), &ctx)
}

async fn update_records(
    State(state): State<Arc<AppState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    blocking(state, move |state| update_records_page(state, form)).await
}

fn update_records_page(state: &AppState, form: HashMap<String, String>) -> Response {
    let mut notices = Vec::new();
    let year = pick_sheet(form.get("sheet").map(String::as_str), &mut notices);
    let mut book = match load_years(state, Action::Update) {
        Ok(book) => book,
        Err(resp) => return resp,
    };
    let mut table = take_table(&mut book, year);

    let columns = form.get("columns").cloned().unwrap_or_default();
    let edits: Vec<CellEdit> = editor::parse_column_list(&columns)
        .into_iter()
        .enumerate()
        .map(|(i, column)| CellEdit {
            column,
            row: form.get(&format!("row_{}", i)).cloned().unwrap_or_default(),
            value: form.get(&format!("value_{}", i)).cloned().unwrap_or_default(),
        })
        .collect();

    let report = RecordEditor::new(&state.store, year.as_str()).update(&mut table, &edits);
    report_notices(&report, &mut notices);

    // Warnings were already reported for the edits; don't repeat them for the form
    let ctx = update_ctx(year, &table, &columns, &mut Vec::new());
    render_page(state, Action::Update, notices, Some("update"), &ctx)
}

fn delete_ctx(year: SheetYear, table: &Table, name: &str, matches: Option<Table>) -> Value {
    let (sheets, picker_label) = sheet_options(year, "Select sheet to delete data:");
    json!({
        "sheet": year.as_str(),
        "sheets": sheets,
        "picker_label": picker_label,
        "name": name,
        "matches": matches.as_ref().map(table_ctx),
        "table": table_ctx(table),
    })
}

async fn delete_form(Query(params): Query<DeleteQuery>, State(state): State<Arc<AppState>>) -> Response {
    blocking(state, move |state| delete_form_page(state, params)).await
}

fn delete_form_page(state: &AppState, params: DeleteQuery) -> Response {
    let mut notices = Vec::new();
    let year = pick_sheet(params.sheet.as_deref(), &mut notices);
    let mut book = match load_years(state, Action::Delete) {
        Ok(book) => book,
        Err(resp) => return resp,
    };
    let table = take_table(&mut book, year);

    let name = params.name.unwrap_or_default();
    let mut matches = None;
    if !name.trim().is_empty() {
        match editor::find_player_rows(&table, &name) {
            Ok(rows) => matches = Some(table.select_rows(&rows)),
            Err(warning) => notices.push(Notice::warning(warning.to_string())),
        }
    }

    let ctx = delete_ctx(year, &table, &name, matches);
    render_page(state, Action::Delete, notices, Some("delete"), &ctx)
}

async fn delete_records(State(state): State<Arc<AppState>>, Form(form): Form<DeleteForm>) -> Response {
    blocking(state, move |state| delete_records_page(state, form)).await
}

fn delete_records_page(state: &AppState, form: DeleteForm) -> Response {
    let mut notices = Vec::new();
    let year = pick_sheet(Some(&form.sheet), &mut notices);
    let mut book = match load_years(state, Action::Delete) {
        Ok(book) => book,
        Err(resp) => return resp,
    };
    let mut table = take_table(&mut book, year);

    let confirmation = form
        .confirm
        .as_deref()
        .and_then(|c| c.parse::<Confirmation>().ok())
        .unwrap_or_default();

    let report = RecordEditor::new(&state.store, year.as_str()).delete(&mut table, &form.name, confirmation);
    match &report.outcome {
        DeleteOutcome::Deleted { removed } => {
            notices.push(Notice::info(format!("Deleted {} row(s).", removed)));
        }
        DeleteOutcome::Aborted { .. } => notices.push(Notice::info("Deletion aborted.")),
        DeleteOutcome::Skipped(warning) => notices.push(Notice::warning(warning.to_string())),
    }
    if let Some(saved) = &report.saved {
        notices.push(save_notice(saved));
    }

    let ctx = delete_ctx(year, &table, "", None);
    render_page(state, Action::Delete, notices, Some("delete"), &ctx)
}

async fn display_sheet(Query(params): Query<SheetQuery>, State(state): State<Arc<AppState>>) -> Response {
    blocking(state, move |state| display_sheet_page(state, params)).await
}

fn display_sheet_page(state: &AppState, params: SheetQuery) -> Response {
    let mut notices = Vec::new();
    let year = pick_sheet(params.sheet.as_deref(), &mut notices);
    let mut book = match load_years(state, Action::Display) {
        Ok(book) => book,
        Err(resp) => return resp,
    };
    let table = take_table(&mut book, year);

    let (sheets, picker_label) = sheet_options(year, "Select sheet to display:");
    let ctx = json!({
        "sheet": year.as_str(),
        "sheets": sheets,
        "picker_label": picker_label,
        "table": table_ctx(&table),
    });
    render_page(state, Action::Display, notices, Some("display"), &ctx)
}

/// Turns the plot query into a chart request, defaulting unset columns to the first one.
fn plot_spec(table: &Table, params: &PlotQuery) -> Result<PlotSpec, String> {
    let kind = match params.kind.as_deref().filter(|k| !k.is_empty()) {
        Some(k) => k.parse::<PlotKind>()?,
        None => PlotKind::default(),
    };
    let first = table.columns().first().cloned().unwrap_or_default();
    let pick = |v: &Option<String>| v.clone().filter(|c| !c.is_empty()).unwrap_or_else(|| first.clone());

    Ok(match kind {
        PlotKind::Countplot => PlotSpec::Count {
            column: pick(&params.column),
        },
        PlotKind::Line => PlotSpec::Line {
            x: pick(&params.x),
            y: pick(&params.y),
        },
        PlotKind::Histogram => PlotSpec::Histogram {
            column: pick(&params.column),
        },
    })
}

fn column_options(table: &Table, selected: &str) -> Vec<Value> {
    table
        .columns()
        .iter()
        .map(|c| json!({ "name": c, "selected": c == selected }))
        .collect()
}

fn image_url(year: SheetYear, spec: &PlotSpec) -> String {
    let mut query = format!(
        "/plot.png?sheet={}&kind={}",
        year,
        urlencoding::encode(spec.kind().label())
    );
    match spec {
        PlotSpec::Count { column } | PlotSpec::Histogram { column } => {
            query.push_str(&format!("&column={}", urlencoding::encode(column)));
        }
        PlotSpec::Line { x, y } => {
            query.push_str(&format!(
                "&x={}&y={}",
                urlencoding::encode(x),
                urlencoding::encode(y)
            ));
        }
    }
    query
}

async fn plot_page(Query(params): Query<PlotQuery>, State(state): State<Arc<AppState>>) -> Response {
    blocking(state, move |state| plot_form_page(state, params)).await
}

fn plot_form_page(state: &AppState, params: PlotQuery) -> Response {
    let mut notices = Vec::new();
    let year = pick_sheet(params.sheet.as_deref(), &mut notices);
    let mut book = match load_years(state, Action::Plot) {
        Ok(book) => book,
        Err(resp) => return resp,
    };
    let table = take_table(&mut book, year);

    let spec = match plot_spec(&table, &params) {
        Ok(spec) => spec,
        Err(e) => {
            notices.push(Notice::warning(e));
            PlotSpec::Count {
                column: table.columns().first().cloned().unwrap_or_default(),
            }
        }
    };

    let image = match graph::prepare(&table, &spec) {
        Ok(_) => Some(image_url(year, &spec)),
        Err(e) => {
            warn!("Plot on sheet '{}' rejected: {}", year, e);
            notices.push(Notice::error(e.to_string()));
            None
        }
    };

    let (column, x, y) = match &spec {
        PlotSpec::Count { column } | PlotSpec::Histogram { column } => (column.as_str(), "", ""),
        PlotSpec::Line { x, y } => ("", x.as_str(), y.as_str()),
    };
    let kinds: Vec<Value> = PlotKind::ALL
        .iter()
        .map(|k| json!({ "name": k.label(), "selected": *k == spec.kind() }))
        .collect();
    let (sheets, picker_label) = sheet_options(year, "Select sheet to plot:");

    let ctx = json!({
        "sheet": year.as_str(),
        "sheets": sheets,
        "picker_label": picker_label,
        "kinds": kinds,
        "kind_label": spec.kind().label(),
        "line": spec.kind() == PlotKind::Line,
        "column_options": column_options(&table, column),
        "x_options": column_options(&table, x),
        "y_options": column_options(&table, y),
        "image": image,
    });
    render_page(state, Action::Plot, notices, Some("plot"), &ctx)
}

async fn plot_image(Query(params): Query<PlotQuery>, State(state): State<Arc<AppState>>) -> Response {
    blocking(state, move |state| plot_image_page(state, params)).await
}

fn plot_image_page(state: &AppState, params: PlotQuery) -> Response {
    let mut notices = Vec::new();
    let year = pick_sheet(params.sheet.as_deref(), &mut notices);
    let table = match state.store.load(year.as_str()) {
        Ok(table) => table,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.user_message()).into_response(),
    };

    let spec = match plot_spec(&table, &params) {
        Ok(spec) => spec,
        Err(e) => return (StatusCode::BAD_REQUEST, e).into_response(),
    };

    match graph::create_graph(&table, &spec, &state.graph) {
        Ok(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Err(e @ PlotError::Render(_)) => {
            error!("{}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

async fn sheet_json(Path(sheet): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    blocking(state, move |state| sheet_json_page(state, sheet)).await
}

fn sheet_json_page(state: &AppState, sheet: String) -> Response {
    let Ok(year) = sheet.parse::<SheetYear>() else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "error", "message": format!("Unknown sheet: {}", sheet) })),
        )
            .into_response();
    };

    match state.store.load(year.as_str()) {
        Ok(table) => Json(table).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "status": "error", "message": e.user_message() })),
        )
            .into_response(),
    }
}

async fn download_csv(Path(sheet): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    blocking(state, move |state| download_csv_page(state, sheet)).await
}

fn download_csv_page(state: &AppState, sheet: String) -> Response {
    let Ok(year) = sheet.parse::<SheetYear>() else {
        return (StatusCode::NOT_FOUND, format!("Unknown sheet: {}", sheet)).into_response();
    };

    match state.store.load(year.as_str()) {
        Ok(table) => (
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}.csv\"", year),
                ),
            ],
            downloader::to_csv(&table),
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.user_message()).into_response(),
    }
}
