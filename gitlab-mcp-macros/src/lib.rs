//! Procedural macros for gitlab-mcp-server
//!
//! This crate provides the `#[gitlab_tool]` attribute macro for defining GitLab MCP tools
//! with minimal boilerplate.

use darling::{FromMeta, ast::NestedMeta};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{DeriveInput, parse_macro_input};

/// Arguments for the `#[gitlab_tool]` attribute
#[derive(Debug, FromMeta)]
struct GitLabToolArgs {
    /// Tool name (e.g., "create_issue")
    name: String,
    /// Tool description for MCP
    description: String,
    /// Tool category (projects, issues, merge_requests, ...)
    category: String,
    /// Operation type: "read", "write", "delete", or "execute"
    operation: String,
}

/// Attribute macro for GitLab MCP tools.
///
/// This macro generates:
/// - `ToolInfo` trait implementation (name, description, category, operation_type)
/// - JSON Schema for input arguments via schemars
/// - An `inventory` submission so `ToolRegistry::register_all_auto` discovers the tool
/// - Automatically adds `#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]`
///
/// # Example
///
/// ```ignore
/// #[gitlab_tool(
///     name = "create_issue",
///     description = "Create a new issue in a GitLab project",
///     category = "issues",
///     operation = "write"
/// )]
/// pub struct CreateIssue {
///     /// Project ID or path
///     pub project_id: IdInput,
///     /// Issue title
///     pub title: String,
///     /// Issue description (optional)
///     #[serde(default)]
///     pub description: Option<String>,
/// }
///
/// #[async_trait]
/// impl ToolExecutor for CreateIssue {
///     async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
///         // Your implementation here
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn gitlab_tool(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr_args = match NestedMeta::parse_meta_list(attr.into()) {
        Ok(v) => v,
        Err(e) => return TokenStream::from(e.to_compile_error()),
    };

    let args = match GitLabToolArgs::from_list(&attr_args) {
        Ok(v) => v,
        Err(e) => return TokenStream::from(e.write_errors()),
    };

    let input = parse_macro_input!(item as DeriveInput);
    let expanded = impl_gitlab_tool(&args, &input);

    TokenStream::from(expanded)
}

fn impl_gitlab_tool(args: &GitLabToolArgs, input: &DeriveInput) -> TokenStream2 {
    let struct_name = &input.ident;
    let tool_name = &args.name;
    let description = &args.description;

    let category_variant = match args.category.as_str() {
        "projects" => quote! { crate::tools::ToolCategory::Projects },
        "issues" => quote! { crate::tools::ToolCategory::Issues },
        "merge_requests" => quote! { crate::tools::ToolCategory::MergeRequests },
        "branches" => quote! { crate::tools::ToolCategory::Branches },
        "files" => quote! { crate::tools::ToolCategory::Files },
        "commits" => quote! { crate::tools::ToolCategory::Commits },
        "tags" => quote! { crate::tools::ToolCategory::Tags },
        "pipelines" => quote! { crate::tools::ToolCategory::Pipelines },
        "jobs" => quote! { crate::tools::ToolCategory::Jobs },
        "groups" => quote! { crate::tools::ToolCategory::Groups },
        "users" => quote! { crate::tools::ToolCategory::Users },
        "labels" => quote! { crate::tools::ToolCategory::Labels },
        "milestones" => quote! { crate::tools::ToolCategory::Milestones },
        other => {
            return syn::Error::new_spanned(input, format!("Unknown category: {}", other))
                .to_compile_error();
        }
    };

    let operation_variant = match args.operation.as_str() {
        "read" => quote! { crate::tools::OperationType::Read },
        "write" => quote! { crate::tools::OperationType::Write },
        "delete" => quote! { crate::tools::OperationType::Delete },
        "execute" => quote! { crate::tools::OperationType::Execute },
        other => {
            return syn::Error::new_spanned(
                input,
                format!(
                    "Unknown operation: {}. Use: read, write, delete, or execute",
                    other
                ),
            )
            .to_compile_error();
        }
    };

    let vis = &input.vis;
    let attrs: Vec<_> = input.attrs.iter().collect();
    let generics = &input.generics;

    let fields = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(
                    input,
                    "gitlab_tool only supports structs with named fields",
                )
                .to_compile_error();
            }
        },
        _ => {
            return syn::Error::new_spanned(input, "gitlab_tool only supports structs")
                .to_compile_error();
        }
    };

    let register_fn = format_ident!("__register_{}", struct_name);

    quote! {
        #(#attrs)*
        #[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
        #vis struct #struct_name #generics {
            #fields
        }

        impl crate::tools::ToolInfo for #struct_name {
            fn name() -> &'static str {
                #tool_name
            }

            fn description() -> &'static str {
                #description
            }

            fn category() -> crate::tools::ToolCategory {
                #category_variant
            }

            fn operation_type() -> crate::tools::OperationType {
                #operation_variant
            }
        }

        #[allow(non_snake_case)]
        fn #register_fn(registry: &mut crate::tools::ToolRegistry) {
            registry.register::<#struct_name>();
        }

        ::inventory::submit! {
            crate::tools::registry::ToolRegistration {
                register_fn: #register_fn,
            }
        }
    }
}
