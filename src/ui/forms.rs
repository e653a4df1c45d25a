use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use thiserror::Error;

use crate::models::{Column, ColumnKind, Product, ProductDraft};

/// Rejected form input. Every failing field contributes one message so the
/// user sees all problems at once instead of fixing them one by one.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", .messages.join(" "))]
pub struct ValidationError {
    pub messages: Vec<String>,
}

/// Entry form for adding or updating a product. Raw text is kept per field
/// and only converted when the user saves.
#[derive(Clone)]
pub(crate) struct ProductForm {
    pub(crate) name: String,
    pub(crate) quantity: String,
    pub(crate) price: String,
    pub(crate) active: Column,
    pub(crate) error: Option<String>,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            quantity: String::new(),
            price: String::new(),
            active: Column::Name,
            error: None,
        }
    }
}

impl ProductForm {
    /// Pre-fill the form from the selected row when updating.
    pub(crate) fn from_product(product: &Product) -> Self {
        let draft = product.to_draft();
        Self {
            name: draft.name,
            quantity: draft.quantity.to_string(),
            price: draft.price.to_string(),
            active: Column::Name,
            error: None,
        }
    }

    pub(crate) fn value(&self, field: Column) -> &str {
        match field {
            Column::Name => &self.name,
            Column::Quantity => &self.quantity,
            Column::Price => &self.price,
        }
    }

    fn value_mut(&mut self, field: Column) -> &mut String {
        match field {
            Column::Name => &mut self.name,
            Column::Quantity => &mut self.quantity,
            Column::Price => &mut self.price,
        }
    }

    /// Move focus to the next field, wrapping from Price back to Name.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            Column::Name => Column::Quantity,
            Column::Quantity => Column::Price,
            Column::Price => Column::Name,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            Column::Name => Column::Price,
            Column::Quantity => Column::Name,
            Column::Price => Column::Quantity,
        };
    }

    /// Append a character to the active field. Control characters are
    /// ignored; type checking waits until save.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let field = self.active;
        self.value_mut(field).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Check each field against its column kind and return a draft ready for
    /// persistence, or every problem found.
    pub(crate) fn parse_inputs(&self) -> Result<ProductDraft, ValidationError> {
        let mut messages = Vec::new();
        for column in Column::ALL {
            let raw = self.value(column).trim();
            if raw.is_empty() {
                messages.push(format!("{} is required.", column.label()));
            } else if !column.kind().accepts(raw) {
                messages.push(kind_message(column));
            }
        }

        if !messages.is_empty() {
            return Err(ValidationError { messages });
        }

        match (
            self.quantity.trim().parse::<i64>(),
            self.price.trim().parse::<f64>(),
        ) {
            (Ok(quantity), Ok(price)) => Ok(ProductDraft::new(self.name.trim(), quantity, price)),
            _ => Err(ValidationError {
                messages: vec![kind_message(Column::Quantity), kind_message(Column::Price)],
            }),
        }
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: Column) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Character count of the requested field, used to place the cursor.
    pub(crate) fn value_len(&self, field: Column) -> usize {
        self.value(field).chars().count()
    }
}

fn kind_message(column: Column) -> String {
    let kind = column.kind();
    match kind {
        ColumnKind::Integer => format!("{} must be a whole number ({kind}).", column.label()),
        ColumnKind::Real => format!("{} must be a number ({kind}).", column.label()),
        ColumnKind::Text => format!("{} must be text ({kind}).", column.label()),
    }
}

/// Rows waiting on a delete confirmation.
#[derive(Clone)]
pub(crate) struct ConfirmDelete {
    pub(crate) ids: Vec<i64>,
    pub(crate) summary: String,
}

impl ConfirmDelete {
    /// Build the confirmation from the products about to be removed.
    pub(crate) fn from_products(products: &[&Product]) -> Self {
        let summary = match products {
            [single] => format!("Delete \"{}\" (id {})?", single.name, single.id),
            many => format!("Delete {} marked products?", many.len()),
        };
        Self {
            ids: products.iter().map(|p| p.id).collect(),
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, quantity: &str, price: &str) -> ProductForm {
        ProductForm {
            name: name.to_string(),
            quantity: quantity.to_string(),
            price: price.to_string(),
            ..ProductForm::default()
        }
    }

    #[test]
    fn valid_input_becomes_a_trimmed_draft() {
        let draft = form("  Widget ", " 10", "2.50 ").parse_inputs().unwrap();
        assert_eq!(draft, ProductDraft::new("Widget", 10, 2.5));
    }

    #[test]
    fn every_bad_field_is_reported() {
        let err = form("", "ten", "cheap").parse_inputs().unwrap_err();
        assert_eq!(err.messages.len(), 3);
        assert_eq!(err.messages[0], "Name is required.");
        assert!(err.messages[1].starts_with("Quantity must be a whole number"));
        assert!(err.messages[2].starts_with("Price must be a number"));
    }

    #[test]
    fn fractional_quantity_is_rejected() {
        let err = form("Bolt", "1.5", "0.05").parse_inputs().unwrap_err();
        assert_eq!(err.messages, vec![kind_message(Column::Quantity)]);
    }

    #[test]
    fn focus_cycles_through_all_fields() {
        let mut form = ProductForm::default();
        form.next_field();
        assert_eq!(form.active, Column::Quantity);
        form.next_field();
        form.next_field();
        assert_eq!(form.active, Column::Name);
        form.previous_field();
        assert_eq!(form.active, Column::Price);
    }

    #[test]
    fn typing_goes_to_the_active_field() {
        let mut form = ProductForm::default();
        form.push_char('N');
        form.next_field();
        form.push_char('5');
        form.push_char('\u{7}');
        form.backspace();
        form.push_char('7');
        assert_eq!(form.name, "N");
        assert_eq!(form.quantity, "7");
    }
}
