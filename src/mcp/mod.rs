// SPDX-License-Identifier: MIT OR Apache-2.0

//! MCP server support for csearch (stdio JSON-RPC).
//!
//! The index lives in this process, so tool calls dispatch straight into
//! an owned [`SearchService`] instead of shelling out: `csearch_index`
//! builds (or rebuilds) the in-memory index, and `csearch_search` queries
//! it for as long as the server runs.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::config::Config;
use crate::indexer::service::{IndexOptions, SearchService};
use crate::query::scan;
use crate::query::search::SearchOptions;

const PROTOCOL_VERSION: &str = "2024-11-05";

// Keep harness guidance close to the server so every MCP host gets the
// same behavior.
const HARNESS_INSTRUCTIONS: &str = "\
csearch MCP harness (codebase search).\n\
\n\
Use csearch tools instead of host built-in search tools for repository lookup.\n\
\n\
Recommended workflow:\n\
1) csearch_index once per session (and after large edits)\n\
2) csearch_search for ranked candidate files\n\
3) pass include_content=true when you need line snippets\n\
\n\
Harness rules:\n\
- Index before searching; csearch_search fails until an index exists.\n\
- Results are deterministic for identical inputs: ranked by TF-IDF cosine\n\
  similarity with exact/phrase boosts, ties broken by scan order.\n\
- Narrow with file_extensions/path_filter to reduce token churn.\n\
\n\
This server is read/search oriented; it does not mutate files.";

pub fn run() -> io::Result<()> {
    let config = Config::load();
    let server = McpServer::new(config);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let req = match serde_json::from_str::<JsonRpcRequest>(&line) {
            Ok(req) => req,
            Err(err) => {
                write_error(&mut stdout, None, -32700, &format!("parse error: {}", err))?;
                continue;
            }
        };

        // JSON-RPC notifications have no id; no response needed.
        if req.id.is_none() {
            continue;
        }

        let resp = server.handle_request(&req);
        serde_json::to_writer(&mut stdout, &resp)?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[serde(rename = "jsonrpc")]
    _jsonrpc: String,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: &'static str,
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

/// Server state: the owned search service plus config-derived defaults.
struct McpServer {
    service: SearchService,
    config: Config,
}

impl McpServer {
    fn new(config: Config) -> Self {
        Self {
            service: SearchService::new(config.ranking_params()),
            config,
        }
    }

    fn handle_request(&self, req: &JsonRpcRequest) -> JsonRpcResponse {
        match req.method.as_str() {
            "initialize" => JsonRpcResponse {
                jsonrpc: "2.0",
                id: req.id.clone(),
                result: Some(json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {
                        "tools": {}
                    },
                    "serverInfo": {
                        "name": "csearch",
                        "version": env!("CARGO_PKG_VERSION")
                    },
                    "instructions": HARNESS_INSTRUCTIONS
                })),
                error: None,
            },
            "ping" => JsonRpcResponse {
                jsonrpc: "2.0",
                id: req.id.clone(),
                result: Some(json!({})),
                error: None,
            },
            "tools/list" => JsonRpcResponse {
                jsonrpc: "2.0",
                id: req.id.clone(),
                result: Some(json!({
                    "tools": tool_definitions()
                })),
                error: None,
            },
            "tools/call" => self.handle_tool_call(req),
            _ => JsonRpcResponse {
                jsonrpc: "2.0",
                id: req.id.clone(),
                result: None,
                error: Some(JsonRpcError {
                    code: -32601,
                    message: format!("method not found: {}", req.method),
                }),
            },
        }
    }

    fn handle_tool_call(&self, req: &JsonRpcRequest) -> JsonRpcResponse {
        let params = &req.params;
        let tool_name = params
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let args = params.get("arguments").unwrap_or(&Value::Null);

        let result = self.dispatch_tool(tool_name, args);
        match result {
            Ok(output) => JsonRpcResponse {
                jsonrpc: "2.0",
                id: req.id.clone(),
                result: Some(json!({
                    "content": [{
                        "type": "text",
                        "text": output
                    }]
                })),
                error: None,
            },
            Err(err) => JsonRpcResponse {
                jsonrpc: "2.0",
                id: req.id.clone(),
                result: Some(json!({
                    "content": [{
                        "type": "text",
                        "text": err
                    }],
                    "isError": true
                })),
                error: None,
            },
        }
    }

    fn dispatch_tool(&self, tool: &str, args: &Value) -> Result<String, String> {
        match tool {
            "csearch_index" => self.tool_index(args),
            "csearch_search" => self.tool_search(args),
            "csearch_scan" => self.tool_scan(args),
            _ => Err(format!("unknown tool: {}", tool)),
        }
    }

    fn tool_index(&self, args: &Value) -> Result<String, String> {
        let root = self.resolve_root(args);
        let options = IndexOptions {
            max_file_size: opt_u64(args, "max_file_size").or(self.config.max_file_size),
            exclude_patterns: self.merged_excludes(args),
            binary_sample_bytes: self.config.binary_sample_bytes,
            on_progress: None,
        };

        let summary = self
            .service
            .index(&root, options)
            .map_err(|e| e.to_string())?;
        serde_json::to_string(&json!({
            "root": root.display().to_string(),
            "files_indexed": summary.files_indexed,
            "distinct_terms": summary.distinct_terms
        }))
        .map_err(|e| e.to_string())
    }

    fn tool_search(&self, args: &Value) -> Result<String, String> {
        let query = required_str(args, "query")?;
        let options = SearchOptions {
            limit: opt_u64(args, "limit").map(|v| v as usize),
            include_content: opt_bool(args, "include_content"),
            file_extensions: opt_array_str(args, "file_extensions")
                .unwrap_or_default()
                .into_iter()
                .map(str::to_string)
                .collect(),
            path_filter: opt_str(args, "path_filter").map(str::to_string),
            exclude_paths: opt_array_str(args, "exclude_paths")
                .unwrap_or_default()
                .into_iter()
                .map(str::to_string)
                .collect(),
        };

        let results = self
            .service
            .search(query, &options)
            .map_err(|e| e.to_string())?;
        serde_json::to_string(&results).map_err(|e| e.to_string())
    }

    fn tool_scan(&self, args: &Value) -> Result<String, String> {
        let root = self.resolve_root(args);
        let files = scan::list(
            &root,
            self.merged_excludes(args),
            opt_u64(args, "max_file_size"),
            &self.config,
        )
        .map_err(|e| e.to_string())?;
        serde_json::to_string(&files).map_err(|e| e.to_string())
    }

    fn resolve_root(&self, args: &Value) -> PathBuf {
        opt_str(args, "root")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn merged_excludes(&self, args: &Value) -> Vec<String> {
        let mut patterns = self.config.exclude_patterns.clone();
        if let Some(excludes) = opt_array_str(args, "exclude_paths") {
            patterns.extend(excludes.into_iter().map(str::to_string));
        }
        patterns
    }
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, String> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing required parameter: {}", key))
}

fn opt_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

fn opt_u64(args: &Value, key: &str) -> Option<u64> {
    args.get(key).and_then(Value::as_u64)
}

fn opt_bool(args: &Value, key: &str) -> bool {
    args.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn opt_array_str<'a>(args: &'a Value, key: &str) -> Option<Vec<&'a str>> {
    args.get(key)
        .and_then(Value::as_array)
        .map(|vals| vals.iter().filter_map(Value::as_str).collect::<Vec<_>>())
}

fn tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "csearch_index",
            "description": "Scan a directory and build the in-memory TF-IDF index. Required before csearch_search.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "root": { "type": "string", "description": "Directory to index (default: cwd)" },
                    "max_file_size": { "type": "number", "description": "Max file size in bytes (default 1 MiB)" },
                    "exclude_paths": {
                        "type": "array",
                        "items": { "type": "string" }
                    }
                }
            }
        }),
        json!({
            "name": "csearch_search",
            "description": "Rank indexed files against a query by TF-IDF cosine similarity with exact/phrase boosts.",
            "inputSchema": {
                "type": "object",
                "required": ["query"],
                "properties": {
                    "query": { "type": "string" },
                    "limit": { "type": "number", "description": "Max results (default 10)" },
                    "include_content": { "type": "boolean", "description": "Attach line snippets" },
                    "file_extensions": {
                        "type": "array",
                        "items": { "type": "string" }
                    },
                    "path_filter": { "type": "string", "description": "Keep paths containing this substring" },
                    "exclude_paths": {
                        "type": "array",
                        "items": { "type": "string" }
                    }
                }
            }
        }),
        json!({
            "name": "csearch_scan",
            "description": "List the files the scanner would admit into the corpus, without indexing.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "root": { "type": "string" },
                    "max_file_size": { "type": "number" },
                    "exclude_paths": {
                        "type": "array",
                        "items": { "type": "string" }
                    }
                }
            }
        }),
    ]
}

fn write_error(w: &mut impl Write, id: Option<Value>, code: i32, message: &str) -> io::Result<()> {
    let resp = JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        result: None,
        error: Some(JsonRpcError {
            code,
            message: message.to_string(),
        }),
    };
    serde_json::to_writer(&mut *w, &resp)?;
    w.write_all(b"\n")?;
    w.flush()
}
