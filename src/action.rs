use crate::env::is_identifier;

/// What a single input line asks the session to do.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Action {
    Exit,
    Help,
    VariableQuery(String),
    Assignment { name: String, expression: String },
    Calculation(String),
    Unknown(String),
}

fn command(name: &str) -> Action {
    match name {
        "exit" => Action::Exit,
        "help" => Action::Help,
        other => Action::Unknown(other.to_string()),
    }
}

pub fn classify(line: &str) -> Action {
    let line = line.trim();

    if let Some(name) = line.strip_prefix('/') {
        return command(name);
    }

    if is_identifier(line) {
        return Action::VariableQuery(line.to_string());
    }

    if let Some(idx) = line.find('=') {
        return Action::Assignment {
            name: line[..idx].trim().to_string(),
            expression: line[idx + 1..].trim().to_string(),
        };
    }

    Action::Calculation(line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(name: &str, expression: &str) -> Action {
        Action::Assignment {
            name: name.to_string(),
            expression: expression.to_string(),
        }
    }

    #[test]
    fn test_classify() {
        let cases = vec![
            ("/exit", Action::Exit),
            ("  /help ", Action::Help),
            ("/quit", Action::Unknown("quit".to_string())),
            ("/", Action::Unknown("".to_string())),
            ("x", Action::VariableQuery("x".to_string())),
            (" żółw ", Action::VariableQuery("żółw".to_string())),
            ("x = 5", assignment("x", "5")),
            ("abc=x+1", assignment("abc", "x+1")),
            ("1abc = 2", assignment("1abc", "2")),
            ("a = b = 3", assignment("a", "b = 3")),
            ("x =", assignment("x", "")),
            ("2 + 2", Action::Calculation("2 + 2".to_string())),
            ("x1", Action::Calculation("x1".to_string())),
            ("", Action::Calculation("".to_string())),
        ];
        for (line, expected) in cases.into_iter() {
            assert_eq!(classify(line), expected, "line {:?}", line);
        }
    }
}
