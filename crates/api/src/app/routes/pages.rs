//! Guarded and public pages. Rendering is deliberately bare.

use axum::{Extension, response::Html};

use crate::context::PrincipalContext;

pub async fn index(principal: Option<Extension<PrincipalContext>>) -> Html<String> {
    let greeting = match principal {
        Some(Extension(ctx)) => format!("<p>Signed in as {}.</p>", ctx.display_name()),
        None => r#"<p><a href="/account/login">Sign in</a></p>"#.to_string(),
    };
    Html(format!(
        r#"<h1>Home</h1>{greeting}
<ul>
  <li><a href="/settings">Settings</a> (AdminOnly)</li>
  <li><a href="/human-resource">Human resource</a> (MustBelongToHRDepartment)</li>
  <li><a href="/hr-manager">HR manager</a> (HRManagerOnly)</li>
</ul>"#
    ))
}

pub async fn settings(Extension(ctx): Extension<PrincipalContext>) -> Html<String> {
    page("Settings", &ctx)
}

pub async fn human_resource(Extension(ctx): Extension<PrincipalContext>) -> Html<String> {
    page("Human Resource", &ctx)
}

pub async fn hr_manager(Extension(ctx): Extension<PrincipalContext>) -> Html<String> {
    page("HR Manager", &ctx)
}

fn page(title: &str, ctx: &PrincipalContext) -> Html<String> {
    Html(format!(
        "<h1>{title}</h1><p>Signed in as {}.</p>",
        ctx.display_name()
    ))
}
