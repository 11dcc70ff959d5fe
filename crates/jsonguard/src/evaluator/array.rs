use super::Evaluator;
use crate::{
    error::ValidationError,
    node::{AdditionalItems, Items},
    paths::LazyLocation,
    value::JsonValue,
};

impl<'s> Evaluator<'s> {
    pub(super) fn is_valid_items(&mut self, items: &'s Items, values: &[JsonValue]) -> bool {
        match items {
            Items::Single(node) => values.iter().all(|item| self.is_valid(*node, item)),
            Items::Tuple { nodes, additional } => {
                let positional = nodes
                    .iter()
                    .zip(values)
                    .all(|(node, item)| self.is_valid(*node, item));
                if !positional {
                    return false;
                }
                let extra = values.get(nodes.len()..).unwrap_or_default();
                match additional {
                    AdditionalItems::Allowed => true,
                    AdditionalItems::Forbidden(_) => extra.is_empty(),
                    AdditionalItems::Schema(node) => {
                        extra.iter().all(|item| self.is_valid(*node, item))
                    }
                }
            }
        }
    }

    pub(super) fn validate_items<'i>(
        &mut self,
        items: &'s Items,
        values: &'i [JsonValue],
        instance: &'i JsonValue,
        location: &LazyLocation<'_>,
        errors: &mut Vec<ValidationError<'i>>,
    ) {
        match items {
            Items::Single(node) => {
                for (idx, item) in values.iter().enumerate() {
                    self.validate(*node, item, &location.push(idx), errors);
                }
            }
            Items::Tuple { nodes, additional } => {
                for (idx, (node, item)) in nodes.iter().zip(values).enumerate() {
                    self.validate(*node, item, &location.push(idx), errors);
                }
                if values.len() <= nodes.len() {
                    return;
                }
                match additional {
                    AdditionalItems::Allowed => {}
                    AdditionalItems::Forbidden(schema_path) => {
                        errors.push(ValidationError::additional_items(
                            schema_path.clone(),
                            location.into(),
                            instance,
                            nodes.len(),
                        ));
                    }
                    AdditionalItems::Schema(node) => {
                        for (idx, item) in values.iter().enumerate().skip(nodes.len()) {
                            self.validate(*node, item, &location.push(idx), errors);
                        }
                    }
                }
            }
        }
    }
}
