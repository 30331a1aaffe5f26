use super::ApiError;

pub fn validate_id(id: i32, resource: &str) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {resource} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

pub fn validate_quantity(quantity: i32) -> Result<i32, ApiError> {
    if quantity < 1 {
        return Err(ApiError::validation("La cantidad debe ser al menos 1"));
    }
    Ok(quantity)
}

pub fn validate_name(name: &str) -> Result<&str, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("El nombre del producto es requerido"));
    }
    if trimmed.chars().count() > 100 {
        return Err(ApiError::validation(
            "El nombre no puede exceder 100 caracteres",
        ));
    }
    Ok(trimmed)
}

pub fn validate_description(description: &str) -> Result<&str, ApiError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("La descripción es requerida"));
    }
    if trimmed.chars().count() > 500 {
        return Err(ApiError::validation(
            "La descripción no puede exceder 500 caracteres",
        ));
    }
    Ok(trimmed)
}

pub fn validate_price(price: f64) -> Result<f64, ApiError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::validation("El precio no puede ser negativo"));
    }
    Ok(price)
}

pub fn validate_stock(quantity: i32) -> Result<i32, ApiError> {
    if quantity < 0 {
        return Err(ApiError::validation("La cantidad no puede ser negativa"));
    }
    Ok(quantity)
}
