use mongodb::bson::{self, Binary, Bson, spec::BinarySubtype};
use serde::Serialize;
use uuid::Uuid;

/// The BSON value a `Uuid` field takes once a document is written.
///
/// Collection writes use the driver's raw serializer, which is not
/// human-readable, so `Uuid` fields land as generic binary. Query filters
/// must compare against the same representation.
pub fn uuid_to_bson(id: Uuid) -> Bson {
    Bson::Binary(Binary {
        subtype: BinarySubtype::Generic,
        bytes: id.as_bytes().to_vec(),
    })
}

/// Serialize a value for `$set`/`$push` updates with the same encoding the
/// driver uses for whole-document writes.
pub fn to_stored_bson<T: Serialize>(value: &T) -> Result<Bson, bson::ser::Error> {
    let options = bson::SerializerOptions::builder()
        .human_readable(false)
        .build();
    bson::to_bson_with_options(value, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Holder {
        id: Uuid,
    }

    #[test]
    fn test_uuid_encoding_matches_stored_field() {
        let id = Uuid::now_v7();
        let stored = to_stored_bson(&Holder { id }).unwrap();

        let doc = stored.as_document().unwrap();
        assert_eq!(doc.get("id"), Some(&uuid_to_bson(id)));
    }
}
