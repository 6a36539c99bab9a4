use chem_econ::input::AnalysisRequest;
use chem_econ::output::Output;
use chem_econ::reference_data::{multipliers_from_csv, ProjectDataTable};
use chem_econ::{run_project, AnalysisResult, ChemEconError, ReferenceData};
use lambda_http::http::Method;
use lambda_http::{run, service_fn, tracing, Body, Error, Request, RequestExt, Response};
use parking_lot::Mutex;
use serde_json::json;
use std::io;
use std::io::{ErrorKind, Write};
use std::str::from_utf8;
use std::sync::Arc;
use uuid::Uuid;

async fn function_handler(
    event: Request,
    reference_data: Arc<ReferenceData>,
) -> Result<Response<Body>, Error> {
    match (event.method(), event.uri().path()) {
        (&Method::GET, "/") => json_response(200, endpoint_index()),
        (&Method::GET, "/defaults") => {
            json_response(200, serde_json::to_value(AnalysisRequest::defaults())?)
        }
        (&Method::GET, "/locations") => {
            json_response(200, json!(reference_data.project_data.locations()))
        }
        (&Method::GET, "/products") => {
            json_response(200, json!(reference_data.project_data.products()))
        }
        (&Method::POST, "/analyze") => run_analyses(&event, &reference_data),
        _ => error_response(404, "No such route"),
    }
}

const ENDPOINTS: [(&str, &str); 4] = [
    ("/analyze", "POST - Run breakeven analyses for a request or a batch of requests"),
    ("/defaults", "GET - View default request values"),
    ("/locations", "GET - List locations with reference data"),
    ("/products", "GET - List products with reference data"),
];

fn endpoint_index() -> serde_json::Value {
    json!({
        "message": "Chemical plant economics API",
        "endpoints": ENDPOINTS
            .iter()
            .map(|(path, description)| (path.to_string(), json!(description)))
            .collect::<serde_json::Map<_, _>>(),
    })
}

fn run_analyses(event: &Request, reference_data: &ReferenceData) -> Result<Response<Body>, Error> {
    let input = match event.body() {
        Body::Empty => "",
        Body::Text(text) => text.as_str(),
        Body::Binary(_) => return error_response(415, "Request body must be JSON text"),
    }
    .as_bytes();

    let wants_csv = event
        .query_string_parameters()
        .first("format")
        .is_some_and(|format| format.eq_ignore_ascii_case("csv"));
    let output = LambdaOutput::new(wants_csv);

    match run_project(input, &output, reference_data) {
        Ok(results) if wants_csv => {
            tracing::info!(analyses = results.len(), "returning CSV result tables");
            Ok(Response::builder()
                .status(200)
                .header("Content-Type", "text/csv")
                .body(output.into_body())
                .map_err(Box::new)?)
        }
        Ok(results) => json_response(200, result_records(&results)?),
        Err(
            e @ (ChemEconError::InvalidRequest(_) | ChemEconError::FailureInCalculation(_)),
        ) => error_response(422, &e.to_string()),
        Err(e) => error_response(500, &e.to_string()),
    }
}

/// A single request answers with its rows; a batch answers with one row list per request.
fn result_records(results: &[AnalysisResult]) -> serde_json::Result<serde_json::Value> {
    match results {
        [result] => serde_json::to_value(result.rows()),
        _ => serde_json::to_value(results.iter().map(AnalysisResult::rows).collect::<Vec<_>>()),
    }
}

fn json_response(status: u16, body: serde_json::Value) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body)?))
        .map_err(Box::new)?)
}

fn error_response(status: u16, detail: &str) -> Result<Response<Body>, Error> {
    json_response(
        status,
        json!({"errors": [{"id": Uuid::new_v4(), "status": status.to_string(), "detail": detail}]}),
    )
}

fn load_reference_data() -> anyhow::Result<ReferenceData> {
    Ok(ReferenceData::new(
        ProjectDataTable::from_csv(include_str!("../../test_data/project_data.csv").as_bytes())?,
        multipliers_from_csv(
            include_str!("../../test_data/sectorwise_multipliers.csv").as_bytes(),
        )?,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let reference_data = Arc::new(load_reference_data()?);

    run(service_fn(move |event| {
        function_handler(event, reference_data.clone())
    }))
    .await
}

/// This output uses a shared string that individual "file" writers (the FileLikeStringWriter type)
/// can write to - this string can then be used as the response body for the Lambda. When the caller
/// asked for JSON the output is a no-op, so no CSV is rendered.
#[derive(Debug)]
struct LambdaOutput {
    string: Arc<Mutex<String>>,
    enabled: bool,
}

impl LambdaOutput {
    fn new(enabled: bool) -> Self {
        Self {
            string: Default::default(),
            enabled,
        }
    }

    fn into_body(self) -> Body {
        std::mem::take(&mut *self.string.lock()).into()
    }
}

impl Output for &LambdaOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        Ok(FileLikeStringWriter::new(self.string.clone(), location_key))
    }

    fn is_noop(&self) -> bool {
        !self.enabled
    }
}

/// Represents a writer for an individual "file".
struct FileLikeStringWriter {
    string: Arc<Mutex<String>>,
    location_key: String,
    has_output_file_header: bool,
}

impl FileLikeStringWriter {
    fn new(string: Arc<Mutex<String>>, location_key: &str) -> Self {
        Self {
            string,
            location_key: location_key.to_string(),
            has_output_file_header: false,
        }
    }
}

impl Write for FileLikeStringWriter {
    /// Writes out bytes to this "file" (part of the wider LambdaOutput string). Every file after
    /// the first is preceded by a line naming it, so a batch response can be split back up.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.has_output_file_header {
            let mut output_string = self.string.lock();
            if !output_string.is_empty() {
                output_string.push_str("\n\n");
                output_string.push_str(format!("# {}.csv\n", self.location_key).as_str());
            }
            self.has_output_file_header = true;
        }
        let utf8 = match from_utf8(buf) {
            Ok(utf8) => utf8,
            Err(_) => {
                return Err(io::Error::new(
                    ErrorKind::InvalidData,
                    "Tried to write out invalid UTF-8.",
                ));
            }
        };
        self.string.lock().push_str(utf8);
        Ok(utf8.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
