//! Per-request orchestration and the request loops.

use std::io::{BufRead, Write};
use std::time::Instant;

use tracing::{debug, info_span, warn};
use uva_core::{Recovered, parse_all};

use crate::error::AnalyzerError;
use crate::lint::Linter;
use crate::report::Report;
use crate::resolve::resolve_declarations;
use crate::source::{Request, SourceFiles};
use crate::tokens::TokenStream;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzerOptions {
    /// Put recovered pipeline faults into the report under `faults`.
    pub report_faults: bool,
}

/// Analyze one request from scratch.
///
/// Only input validation can fail; lexer, preprocessor and parser faults
/// are logged and the analysis proceeds over whatever they produced.
pub fn analyze(request: &Request, options: &AnalyzerOptions) -> Result<Report, AnalyzerError> {
    let span = info_span!("request", input = %request.input_path.display());
    let _guard = span.enter();

    let started = Instant::now();
    let files = SourceFiles::open(request)?;

    let mut faults = Vec::new();
    let tokens = proceed(TokenStream::load(&files), &mut faults);
    let findings = Linter::default().run(&tokens, &files);
    let root = proceed(parse_all(tokens.as_slice()), &mut faults);
    let declarations = resolve_declarations(&root, &tokens);

    if !options.report_faults {
        faults.clear();
    }

    Ok(Report {
        findings,
        declarations,
        elapsed: started.elapsed(),
        faults,
    })
}

/// Take the value out of a recovered stage, noting any faults.
fn proceed<T>(recovered: Recovered<T>, faults: &mut Vec<String>) -> T {
    let (value, stage_faults) = recovered.into_parts();
    for fault in stage_faults {
        debug!(%fault, "continuing with partial result");
        faults.push(fault.to_string());
    }
    value
}

/// Analyze `request` and write its report to `output`.
pub fn run_request<W: Write>(
    request: &Request,
    options: &AnalyzerOptions,
    output: &mut W,
) -> Result<(), AnalyzerError> {
    let report = analyze(request, options)?;
    report.write_json(&mut *output)?;
    output.flush()?;
    Ok(())
}

/// Serve requests read from `input` until it is exhausted.
///
/// Each request is two lines: the input path, then the buffer path. A
/// fatal fault in any request ends the loop with that error. Returns the
/// number of requests served.
pub fn serve<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    options: &AnalyzerOptions,
) -> Result<usize, AnalyzerError> {
    let mut lines = input.lines();
    let mut served = 0;

    loop {
        let Some(input_path) = lines.next().transpose().map_err(AnalyzerError::RequestRead)?
        else {
            break;
        };
        let Some(buffer_path) = lines.next().transpose().map_err(AnalyzerError::RequestRead)?
        else {
            warn!(input = %input_path, "input closed in the middle of a request");
            break;
        };

        run_request(&Request::new(input_path, buffer_path), options, output)?;
        served += 1;
    }

    debug!(served, "request stream closed");
    Ok(served)
}
