use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;

use super::{AuthError, code_from_params};

pub async fn ask_for_code(auth_url: &Url, expected_state: &str) -> Result<String, AuthError> {
    println!("Please log in to Spotify by visiting the following page in your browser:");
    println!("{auth_url}");
    print!("Paste the redirect URL here: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;

    code_from_redirect(&line, expected_state)
}

pub fn code_from_redirect(redirect: &str, expected_state: &str) -> Result<String, AuthError> {
    let url = Url::parse(redirect.trim())?;
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    code_from_params(
        pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        expected_state,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_from_redirect() {
        let code = code_from_redirect(
            "http://localhost:8080/callback?code=AQB%2Fxyz&state=s1\n",
            "s1",
        )
        .unwrap();
        assert_eq!(code, "AQB/xyz");
    }

    #[test]
    fn test_code_from_redirect_errors() {
        assert!(matches!(
            code_from_redirect("not a url", "s1"),
            Err(AuthError::Url(_))
        ));
        assert!(matches!(
            code_from_redirect("http://localhost:8080/callback?state=s1", "s1"),
            Err(AuthError::MissingCode)
        ));
        assert!(matches!(
            code_from_redirect("http://localhost:8080/callback?error=access_denied", "s1"),
            Err(AuthError::Denied(_))
        ));
    }
}
