//! The server-drawn pages.
//!
//! No template engine: the handful of views are assembled from string
//! fragments, with the flash errors and login state folded in from the
//! request's [`RenderContext`]. Styling lives in `/static/style.css`.

use axum::http::StatusCode;
use axum::response::Html;

use crate::extractors::RenderContext;

/// Minimal HTML escaping for user-sourced fragments.
fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn flash_block(ctx: &RenderContext) -> String {
    let slots = [
        ("general", &ctx.errors.general),
        ("login", &ctx.errors.login),
        ("register", &ctx.errors.register),
        ("profile", &ctx.errors.profile),
        ("password", &ctx.errors.password),
    ];
    let mut out = String::new();
    for (slot, messages) in slots {
        for message in messages {
            out.push_str(&format!(
                "<p class=\"flash flash-{slot}\">{}</p>\n",
                escape(message)
            ));
        }
    }
    out
}

fn nav(ctx: &RenderContext) -> String {
    if ctx.logged_in {
        let who = ctx
            .user
            .as_ref()
            .map(|user| {
                user.display_name
                    .clone()
                    .unwrap_or_else(|| user.email.clone())
            })
            .unwrap_or_default();
        format!(
            "<nav><a href=\"/home\">Home</a> <a href=\"/channel\">Channels</a> \
             <a href=\"/account\">Account</a> <a href=\"/logout\">Log out</a> \
             <span class=\"who\">{}</span></nav>",
            escape(&who)
        )
    } else {
        "<nav><a href=\"/\">Log in</a> <a href=\"/sign-up\">Sign up</a></nav>".to_string()
    }
}

fn page(title: &str, ctx: &RenderContext, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title} | Huddle</title>\n\
         <link rel=\"stylesheet\" href=\"/static/style.css\">\n\
         </head>\n<body>\n{nav}\n{flash}\n<main>\n{body}\n</main>\n</body>\n</html>\n",
        nav = nav(ctx),
        flash = flash_block(ctx),
    ))
}

fn login_form() -> &'static str {
    "<form method=\"post\" action=\"/login\">\n\
     <label>Email <input type=\"email\" name=\"email\" required></label>\n\
     <label>Password <input type=\"password\" name=\"password\" required></label>\n\
     <button type=\"submit\">Log in</button>\n\
     </form>"
}

fn register_form() -> &'static str {
    "<form method=\"post\" action=\"/register\">\n\
     <label>Email <input type=\"email\" name=\"email\" required></label>\n\
     <label>Password <input type=\"password\" name=\"password\" required></label>\n\
     <label>Confirm password <input type=\"password\" name=\"password_confirm\" required></label>\n\
     <button type=\"submit\">Create account</button>\n\
     </form>"
}

pub fn index(ctx: &RenderContext) -> Html<String> {
    let body = format!(
        "<h1>Welcome to Huddle</h1>\n<p>Log in to join your channels.</p>\n{}",
        login_form()
    );
    page("Welcome", ctx, &body)
}

pub fn register(ctx: &RenderContext) -> Html<String> {
    let body = format!("<h1>Create an account</h1>\n{}", register_form());
    page("Register", ctx, &body)
}

pub fn sign_up(ctx: &RenderContext) -> Html<String> {
    let body = format!("<h1>Sign up</h1>\n{}", register_form());
    page("Sign up", ctx, &body)
}

pub fn home(ctx: &RenderContext) -> Html<String> {
    page("Home", ctx, "<h1>Home</h1>\n<p>Your channels live here.</p>")
}

pub fn channel(ctx: &RenderContext) -> Html<String> {
    page(
        "Channels",
        ctx,
        "<h1>Channels</h1>\n<p>Nothing to show yet.</p>",
    )
}

pub fn account(ctx: &RenderContext) -> Html<String> {
    let (display_name, email) = ctx
        .user
        .as_ref()
        .map(|user| {
            (
                user.display_name.clone().unwrap_or_default(),
                user.email.clone(),
            )
        })
        .unwrap_or_default();
    let body = format!(
        "<h1>Your account</h1>\n\
         <form method=\"post\" action=\"/account\">\n\
         <label>Display name <input type=\"text\" name=\"display_name\" value=\"{display_name}\"></label>\n\
         <label>Email <input type=\"email\" name=\"email\" value=\"{email}\"></label>\n\
         <button type=\"submit\">Update details</button>\n\
         </form>\n\
         <form method=\"post\" action=\"/password\">\n\
         <label>New password <input type=\"password\" name=\"password\" required></label>\n\
         <label>Confirm password <input type=\"password\" name=\"password_confirm\" required></label>\n\
         <button type=\"submit\">Update password</button>\n\
         </form>",
        display_name = escape(&display_name),
        email = escape(&email),
    );
    page("Account", ctx, &body)
}

/// The terminal error view: status code and message, nothing else.
pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <title>Error | Huddle</title>\n\
         <link rel=\"stylesheet\" href=\"/static/style.css\">\n\
         </head>\n<body>\n<main>\n\
         <h1>{status}</h1>\n<p class=\"error\">{message}</p>\n\
         <p><a href=\"/\">Back to the start</a></p>\n\
         </main>\n</body>\n</html>\n",
        status = status,
        message = escape(message),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ErrorSlot;

    #[test]
    fn flash_messages_are_escaped() {
        let mut ctx = RenderContext::default();
        ctx.errors
            .slot_mut(ErrorSlot::Login)
            .push("<script>alert(1)</script>".to_string());
        let Html(body) = index(&ctx);
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<script>alert"));
    }

    #[test]
    fn nav_reflects_login_state() {
        let anonymous = RenderContext::default();
        let Html(body) = home(&anonymous);
        assert!(body.contains("Sign up"));
        assert!(!body.contains("Log out"));

        let logged_in = RenderContext {
            logged_in: true,
            user: Some(common::UserProfile {
                uid: "u1".to_string(),
                email: "a@b.com".to_string(),
                display_name: Some("Ada".to_string()),
            }),
            ..Default::default()
        };
        let Html(body) = home(&logged_in);
        assert!(body.contains("Log out"));
        assert!(body.contains("Ada"));
    }
}
