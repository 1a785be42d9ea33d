use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid Solana address format: {0}")]
    InvalidSolanaAddress(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub fn validate_solana_address(address: &str) -> Result<(), ValidationError> {
    // Check if address is empty
    if address.trim().is_empty() {
        return Err(ValidationError::MissingParameter("address".to_string()));
    }

    // Decode base58 string
    let decoded = match bs58::decode(address.trim()).into_vec() {
        Ok(bytes) => bytes,
        Err(_) => return Err(ValidationError::InvalidSolanaAddress(address.to_string())),
    };

    // Validate length (Solana addresses are 32 bytes)
    if decoded.len() != 32 {
        return Err(ValidationError::InvalidSolanaAddress(address.to_string()));
    }

    // The system program id decodes fine but is never a wallet
    if decoded.iter().all(|b| *b == 0) {
        return Err(ValidationError::InvalidSolanaAddress(address.to_string()));
    }

    Ok(())
}

pub fn validate_job_id(job_id: &str) -> Result<(), ValidationError> {
    let trimmed = job_id.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingParameter("job_id".to_string()));
    }

    if trimmed.len() > 128 || trimmed.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidParameter(format!("job_id: {}", job_id)));
    }

    Ok(())
}
