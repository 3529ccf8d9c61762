/*!
# Player Sheets

A browser-based viewer and editor for yearly player statistics stored in an Excel workbook.

## Overview

The workbook (`final.xlsx` by default) carries one sheet per season: `2024`, `2023`
and `2022`. Each sheet is a table whose header row names the columns and whose
remaining rows are player records. The application shows the sheets, lets the user
add, change and remove records, writes every change straight back to the workbook,
and draws simple charts of the data.

## Architecture

### Frontend Layer
- **Technologies**: HTML rendered from Handlebars templates
- **Key Components**:
  - Sidebar - Picks one of 2024, 2023, 2022, Create, Update, Delete, Display, Plot
  - Sheet table - Shows a sheet with its row indices
  - Forms - Record entry, cell updates, delete confirmation, chart selection

### Backend Layer
- **Technologies**: Rust, axum, tokio
- **Core Components**:
  - Workbook Store - Reads sheets with calamine and writes them with rust_xlsxwriter
  - Performance Evaluator - Turns matches played and won into a feedback tier
  - Record Editor - Create, update and delete on a single sheet
  - Visualizer - Countplot, line plot and histogram rendered to PNG with plotters

### Data Persistence Layer
- Saving a sheet replaces only that sheet; every other sheet keeps its values
- CSV export of any sheet

## Modules

- **table**: Typed cells and the in-memory sheet
- **workbook**: Sheet names, the in-memory workbook and the store over the file
- **loader**: Reading sheets from `.xlsx` files
- **saving**: Writing the workbook back to disk
- **performance**: Win-rate feedback
- **editor**: Record creation, cell updates and player deletion
- **graph**: Chart data preparation and rendering
- **downloader**: CSV export
- **error**: Store errors, validation warnings and plot errors
- **app**: Routing and page handlers (feature `web`)
- **config**: Command-line and environment configuration (feature `web`)

## REST API Endpoints

- `/view/{sheet}` - Shows a sheet with the performance evaluator
- `/create`, `/update`, `/delete` - Record editing pages
- `/display` - Shows a selected sheet
- `/plot`, `/plot.png` - Chart page and the rendered chart
- `/api/sheets/{sheet}` - Sheet contents as JSON
- `/download/{sheet}` - Sheet contents as CSV
*/

pub mod downloader;
pub mod editor;
pub mod error;
pub mod graph;
pub mod loader;
pub mod performance;
pub mod saving;
pub mod table;
pub mod workbook;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod config;

pub use error::{PlotError, Result, StoreError, ValidationWarning};
pub use table::{CellValue, ColumnKind, Table};
pub use workbook::{SheetYear, Workbook, WorkbookStore};
