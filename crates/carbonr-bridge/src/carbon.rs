//! Class names and method signatures of the CarbonData SDK surface we call.
//!
//! Both backends dispatch on these constants: the JVM backend resolves them
//! with `GetMethodID`/`GetStaticMethodID`, the in-memory backend matches on
//! `(class, name, sig)`.

use crate::call::{Method, RetKind};

pub const READER: &str = "org/apache/carbondata/sdk/file/CarbonReader";
pub const READER_BUILDER: &str = "org/apache/carbondata/sdk/file/CarbonReaderBuilder";
pub const WRITER: &str = "org/apache/carbondata/sdk/file/CarbonWriter";
pub const WRITER_BUILDER: &str = "org/apache/carbondata/sdk/file/CarbonWriterBuilder";
pub const SCHEMA_READER: &str = "org/apache/carbondata/sdk/file/CarbonSchemaReader";
pub const SCHEMA: &str = "org/apache/carbondata/sdk/file/Schema";
pub const FIELD: &str = "org/apache/carbondata/core/metadata/datatype/Field";
pub const DATA_TYPE: &str = "org/apache/carbondata/core/metadata/datatype/DataType";
pub const ARRAY_TYPE: &str = "org/apache/carbondata/core/metadata/datatype/ArrayType";
pub const ROW: &str = "org/apache/carbondata/core/datastore/row/Row";
pub const HADOOP_CONF: &str = "org/apache/hadoop/conf/Configuration";

pub mod reader {
    use super::*;

    pub const BUILDER_WITH_TABLE: Method = Method::static_(
        READER,
        "builder",
        "(Ljava/lang/String;Ljava/lang/String;)Lorg/apache/carbondata/sdk/file/CarbonReaderBuilder;",
        RetKind::Object,
    );
    pub const BUILDER: Method = Method::static_(
        READER,
        "builder",
        "(Ljava/lang/String;)Lorg/apache/carbondata/sdk/file/CarbonReaderBuilder;",
        RetKind::Object,
    );
    pub const PROJECTION: Method = Method::instance(
        READER_BUILDER,
        "projection",
        "([Ljava/lang/String;)Lorg/apache/carbondata/sdk/file/CarbonReaderBuilder;",
        RetKind::Object,
    );
    pub const WITH_HADOOP_CONF: Method = Method::instance(
        READER_BUILDER,
        "withHadoopConf",
        "(Ljava/lang/String;Ljava/lang/String;)Lorg/apache/carbondata/sdk/file/CarbonReaderBuilder;",
        RetKind::Object,
    );
    pub const WITH_CONFIGURATION: Method = Method::instance(
        READER_BUILDER,
        "withHadoopConf",
        "(Lorg/apache/hadoop/conf/Configuration;)Lorg/apache/carbondata/sdk/file/CarbonReaderBuilder;",
        RetKind::Object,
    );
    pub const WITH_BATCH: Method = Method::instance(
        READER_BUILDER,
        "withBatch",
        "(I)Lorg/apache/carbondata/sdk/file/CarbonReaderBuilder;",
        RetKind::Object,
    );
    pub const BUILD: Method = Method::instance(
        READER_BUILDER,
        "build",
        "()Lorg/apache/carbondata/sdk/file/CarbonReader;",
        RetKind::Object,
    );
    pub const HAS_NEXT: Method = Method::instance(READER, "hasNext", "()Z", RetKind::Boolean);
    pub const READ_NEXT_ROW: Method =
        Method::instance(READER, "readNextCarbonRow", "()Ljava/lang/Object;", RetKind::Object);
    pub const READ_NEXT_BATCH: Method = Method::instance(
        READER,
        "readNextBatchRow",
        "(I)[Ljava/lang/Object;",
        RetKind::ObjectArray,
    );
    pub const CLOSE: Method = Method::instance(READER, "close", "()V", RetKind::Void);
}

/// Typed getters on one row. Every getter takes the field ordinal.
pub mod row {
    use super::*;

    pub const GET_LENGTH: Method = Method::instance(ROW, "getLength", "()I", RetKind::Int);
    pub const GET_DATA_TYPE_NAME: Method =
        Method::instance(ROW, "getDataTypeName", "(I)Ljava/lang/String;", RetKind::Text);
    pub const GET_ARRAY_ELEMENT_TYPE_NAME: Method = Method::instance(
        ROW,
        "getArrayElementTypeName",
        "(I)Ljava/lang/String;",
        RetKind::Text,
    );
    pub const GET_SHORT: Method = Method::instance(ROW, "getShort", "(I)S", RetKind::Short);
    pub const GET_INT: Method = Method::instance(ROW, "getInt", "(I)I", RetKind::Int);
    pub const GET_LONG: Method = Method::instance(ROW, "getLong", "(I)J", RetKind::Long);
    pub const GET_DOUBLE: Method = Method::instance(ROW, "getDouble", "(I)D", RetKind::Double);
    pub const GET_FLOAT: Method = Method::instance(ROW, "getFloat", "(I)F", RetKind::Float);
    pub const GET_BOOLEAN: Method = Method::instance(ROW, "getBoolean", "(I)Z", RetKind::Boolean);
    pub const GET_STRING: Method =
        Method::instance(ROW, "getString", "(I)Ljava/lang/String;", RetKind::Text);
    pub const GET_DECIMAL: Method =
        Method::instance(ROW, "getDecimal", "(I)Ljava/lang/String;", RetKind::Text);
    pub const GET_VARCHAR: Method =
        Method::instance(ROW, "getVarchar", "(I)Ljava/lang/String;", RetKind::Text);
    /// Elements come back rendered with `toString()`.
    pub const GET_ARRAY: Method =
        Method::instance(ROW, "getArray", "(I)[Ljava/lang/Object;", RetKind::TextArray);
}

pub mod writer {
    use super::*;

    pub const BUILDER: Method = Method::static_(
        WRITER,
        "builder",
        "()Lorg/apache/carbondata/sdk/file/CarbonWriterBuilder;",
        RetKind::Object,
    );
    pub const OUTPUT_PATH: Method = Method::instance(
        WRITER_BUILDER,
        "outputPath",
        "(Ljava/lang/String;)Lorg/apache/carbondata/sdk/file/CarbonWriterBuilder;",
        RetKind::Object,
    );
    pub const WITH_CSV_INPUT: Method = Method::instance(
        WRITER_BUILDER,
        "withCsvInput",
        "(Ljava/lang/String;)Lorg/apache/carbondata/sdk/file/CarbonWriterBuilder;",
        RetKind::Object,
    );
    pub const WITH_HADOOP_CONF: Method = Method::instance(
        WRITER_BUILDER,
        "withHadoopConf",
        "(Ljava/lang/String;Ljava/lang/String;)Lorg/apache/carbondata/sdk/file/CarbonWriterBuilder;",
        RetKind::Object,
    );
    pub const WRITTEN_BY: Method = Method::instance(
        WRITER_BUILDER,
        "writtenBy",
        "(Ljava/lang/String;)Lorg/apache/carbondata/sdk/file/CarbonWriterBuilder;",
        RetKind::Object,
    );
    pub const SORT_BY: Method = Method::instance(
        WRITER_BUILDER,
        "sortBy",
        "([Ljava/lang/String;)Lorg/apache/carbondata/sdk/file/CarbonWriterBuilder;",
        RetKind::Object,
    );
    pub const WITH_BLOCK_SIZE: Method = Method::instance(
        WRITER_BUILDER,
        "withBlockSize",
        "(I)Lorg/apache/carbondata/sdk/file/CarbonWriterBuilder;",
        RetKind::Object,
    );
    pub const WITH_BLOCKLET_SIZE: Method = Method::instance(
        WRITER_BUILDER,
        "withBlockletSize",
        "(I)Lorg/apache/carbondata/sdk/file/CarbonWriterBuilder;",
        RetKind::Object,
    );
    pub const UNIQUE_IDENTIFIER: Method = Method::instance(
        WRITER_BUILDER,
        "uniqueIdentifier",
        "(J)Lorg/apache/carbondata/sdk/file/CarbonWriterBuilder;",
        RetKind::Object,
    );
    pub const BUILD: Method = Method::instance(
        WRITER_BUILDER,
        "build",
        "()Lorg/apache/carbondata/sdk/file/CarbonWriter;",
        RetKind::Object,
    );
    /// The record is a `String[]` in CSV-input mode.
    pub const WRITE: Method = Method::instance(WRITER, "write", "(Ljava/lang/Object;)V", RetKind::Void);
    pub const CLOSE: Method = Method::instance(WRITER, "close", "()V", RetKind::Void);
}

pub mod schema {
    use super::*;

    pub const READ_IN_INDEX_FILE: Method = Method::static_(
        SCHEMA_READER,
        "readSchemaInIndexFile",
        "(Ljava/lang/String;)Lorg/apache/carbondata/sdk/file/Schema;",
        RetKind::Object,
    );
    pub const READ_IN_DATA_FILE: Method = Method::static_(
        SCHEMA_READER,
        "readSchemaInDataFile",
        "(Ljava/lang/String;)Lorg/apache/carbondata/sdk/file/Schema;",
        RetKind::Object,
    );
    pub const READ_IN_SCHEMA_FILE: Method = Method::static_(
        SCHEMA_READER,
        "readSchemaInSchemaFile",
        "(Ljava/lang/String;)Lorg/apache/carbondata/sdk/file/Schema;",
        RetKind::Object,
    );
    pub const GET_VERSION_DETAILS: Method = Method::static_(
        SCHEMA_READER,
        "getVersionDetails",
        "(Ljava/lang/String;)Ljava/lang/String;",
        RetKind::Text,
    );
    pub const GET_FIELDS: Method = Method::instance(
        SCHEMA,
        "getFields",
        "()[Lorg/apache/carbondata/core/metadata/datatype/Field;",
        RetKind::ObjectArray,
    );
    pub const FIELD_NAME: Method =
        Method::instance(FIELD, "getFieldName", "()Ljava/lang/String;", RetKind::Text);
    pub const FIELD_DATA_TYPE: Method = Method::instance(
        FIELD,
        "getDataType",
        "()Lorg/apache/carbondata/core/metadata/datatype/DataType;",
        RetKind::Object,
    );
    pub const TYPE_NAME: Method =
        Method::instance(DATA_TYPE, "getName", "()Ljava/lang/String;", RetKind::Text);
    pub const ELEMENT_TYPE: Method = Method::instance(
        ARRAY_TYPE,
        "getElementType",
        "()Lorg/apache/carbondata/core/metadata/datatype/DataType;",
        RetKind::Object,
    );
}

pub mod conf {
    use super::*;

    pub const NEW: Method = Method::constructor(HADOOP_CONF, "()V");
    pub const SET: Method = Method::instance(
        HADOOP_CONF,
        "set",
        "(Ljava/lang/String;Ljava/lang/String;)V",
        RetKind::Void,
    );
    pub const GET: Method = Method::instance(
        HADOOP_CONF,
        "get",
        "(Ljava/lang/String;)Ljava/lang/String;",
        RetKind::Text,
    );
}
