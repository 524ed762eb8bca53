use validator::ValidationErrors;

/// Flattens field-level validation failures into the human-readable
/// strings shown as flash messages. Field iteration order is not
/// stable, so the result is sorted.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, failures)| {
            failures
                .iter()
                .map(move |failure| match &failure.message {
                    Some(message) => message.to_string(),
                    None => format!("Invalid value for {field}"),
                })
                .collect::<Vec<_>>()
        })
        .collect();
    messages.sort();
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
        #[validate(email(message = "bad email"))]
        email: String,
    }

    #[test]
    fn flattens_all_fields_in_sorted_order() {
        let probe = Probe {
            name: "ab".to_string(),
            email: "nope".to_string(),
        };
        let errors = probe.validate().unwrap_err();
        assert_eq!(
            validation_messages(&errors),
            vec!["bad email".to_string(), "too short".to_string()]
        );
    }
}
