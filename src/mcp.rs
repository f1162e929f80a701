use anyhow::Result;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::commands::info::page_infos;
use crate::commands::remove::remove_pages;
use crate::commands::thumbnails::export;
use crate::pdf::{default_renderer, RenderOptions};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfRemovePagesRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Pages to remove (e.g., '2,5-7,end')")]
    pub pages: String,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfThumbnailsRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Directory to write one PNG per page into")]
    pub output_dir: String,
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    tool_router: ToolRouter<Self>,
    render: RenderOptions,
    pdfium_library: Option<PathBuf>,
}

impl PdfServer {
    pub fn new(render: RenderOptions, pdfium_library: Option<PathBuf>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            render,
            pdfium_library,
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new(RenderOptions::default(), None)
    }
}

#[tool_router]
impl PdfServer {
    #[tool(description = "List the pages of a PDF with their size in points")]
    fn pdf_pages(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        match page_infos(&path) {
            Ok(pages) => {
                let result = PdfPagesResult {
                    path,
                    page_count: pages.len(),
                    pages: pages
                        .into_iter()
                        .map(|p| PageResult {
                            page: p.page,
                            width_pt: p.width_pt,
                            height_pt: p.height_pt,
                        })
                        .collect(),
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(description = "Remove pages from a PDF and save the result to a new file. Use page range syntax like '2,5-7,end'.")]
    fn pdf_remove_pages(&self, Parameters(req): Parameters<PdfRemovePagesRequest>) -> String {
        match remove_pages(&req.path, &req.pages, &req.output) {
            Ok(summary) => {
                let result = RemoveResult {
                    output_path: req.output,
                    removed: summary.removed,
                    page_count: summary.page_count,
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(description = "Render one PNG thumbnail per page of a PDF into a directory")]
    fn pdf_thumbnails(&self, Parameters(req): Parameters<PdfThumbnailsRequest>) -> String {
        let renderer = default_renderer(self.render, self.pdfium_library.as_deref());
        match export(Path::new(&req.path), Path::new(&req.output_dir), renderer) {
            Ok(summary) => {
                let result = ThumbnailsResult {
                    written: summary
                        .written
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect(),
                    unavailable: summary.degraded,
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PdfPagesResult {
    pub path: String,
    pub page_count: usize,
    pub pages: Vec<PageResult>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageResult {
    pub page: usize,
    pub width_pt: Option<f32>,
    pub height_pt: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RemoveResult {
    pub output_path: String,
    pub removed: usize,
    pub page_count: usize,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ThumbnailsResult {
    pub written: Vec<String>,
    pub unavailable: Vec<String>,
}

#[tool_handler]
impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF page removal tools. Use pdf_pages to see which pages a document has, \
                 pdf_thumbnails to render them for inspection, and pdf_remove_pages to write \
                 a copy without the pages you name."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server(render: RenderOptions, pdfium_library: Option<PathBuf>) -> Result<()> {
    let server = PdfServer::new(render, pdfium_library);

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
