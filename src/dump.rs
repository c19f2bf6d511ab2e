//! Human readable rendering of decoded streams (curly blocks + indentation)

use crate::serialization::*;
use std::collections::HashMap;
use std::io::{Result, Write};
use std::sync::Arc;

/// Indentation aware writer that also remembers every inline class descriptor it has printed
///
/// Remembering descriptors is what lets objects whose class is a back-reference still print
/// their field names.
pub struct DumpWriter<W: Write> {
    /// How many blocks have been opened but not closed?
    open_blocks: usize,

    /// Is there a line already in progress?
    line_in_progress: bool,

    /// Descriptors printed since the last reset, by handle
    classes: HashMap<Handle, ClassPointer>,

    /// Bound on super class walks
    max_class_depth: usize,

    inner: W,
}

impl<W: Write> Write for DumpWriter<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        for line in buf.split_inclusive(|b| *b == b'\n') {
            if line != b"\n" {
                self.ensure_line_indented()?;
            }
            self.inner.write_all(line)?;
            self.line_in_progress = false;
        }
        self.line_in_progress = buf.last().copied() != Some(b'\n');
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> DumpWriter<W> {
    pub fn new(inner: W) -> DumpWriter<W> {
        DumpWriter {
            open_blocks: 0,
            line_in_progress: false,
            classes: HashMap::new(),
            max_class_depth: Settings::DEFAULT_MAX_CLASS_DEPTH,
            inner,
        }
    }

    fn ensure_line_indented(&mut self) -> Result<()> {
        if !self.line_in_progress {
            for _ in 0..self.open_blocks {
                self.inner.write_all(b"  ")?;
            }
            self.line_in_progress = true;
        }
        Ok(())
    }

    /// Finish the current line, if one is in progress
    pub fn end_line(&mut self) -> Result<()> {
        if self.line_in_progress {
            self.inner.write_all(b"\n")?;
            self.line_in_progress = false;
        }
        Ok(())
    }

    /// Tack ` {` onto the current line and indent what follows
    pub fn open_block(&mut self) -> Result<()> {
        if self.line_in_progress {
            write!(self, " ")?;
        }
        writeln!(self, "{{")?;
        self.open_blocks += 1;
        Ok(())
    }

    /// Put `}` on a fresh line
    pub fn close_block(&mut self) -> Result<()> {
        debug_assert!(self.open_blocks > 0, "no blocks to close");
        self.end_line()?;
        self.open_blocks = self.open_blocks.saturating_sub(1);
        writeln!(self, "}}")?;
        Ok(())
    }

    /// Forget descriptors (the handle table of the stream was reset)
    fn reset(&mut self) {
        self.classes.clear();
    }

    /// Descriptors with class data for instances of `pointer`, most ancestral first
    ///
    /// Anything that cannot be followed ends the walk early: this is for display only.
    fn ancestors_first(&self, pointer: &ClassPointer) -> Vec<Arc<ClassDesc>> {
        let mut classes = vec![];
        let mut next = pointer.clone();
        for _ in 0..self.max_class_depth {
            next = match next {
                ClassPointer::Null => break,
                ClassPointer::Reference(handle) => match self.classes.get(&handle) {
                    Some(pointer) => pointer.clone(),
                    None => break,
                },
                ClassPointer::ClassDesc(desc) => {
                    let super_class = desc.super_class.clone();
                    classes.push(desc);
                    super_class
                }
                ClassPointer::ProxyClassDesc(proxy) => proxy.super_class.clone(),
            };
        }
        classes.reverse();
        classes
    }

    /// Name of the class a pointer refers to, if it is known
    fn class_name(&self, pointer: &ClassPointer) -> Option<String> {
        match pointer {
            ClassPointer::Null => None,
            ClassPointer::ClassDesc(desc) => Some(desc.class_name.to_string_lossy()),
            ClassPointer::ProxyClassDesc(_) => Some(String::from("<proxy>")),
            ClassPointer::Reference(handle) => self
                .classes
                .get(handle)
                .and_then(|pointer| self.class_name(pointer)),
        }
    }

    /// Close the writer
    pub fn close(mut self) -> Result<()> {
        debug_assert_eq!(self.open_blocks, 0, "un-closed blocks remain");
        self.end_line()?;
        self.inner.flush()
    }
}

/// Records that can be printed for people
pub trait Dump {
    /// Print starting on the current line (nested blocks end their own lines)
    fn dump<W: Write>(&self, out: &mut DumpWriter<W>) -> Result<()>;
}

/// Render bytes as lowercase hex digits
pub fn hexify(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

/// Render a whole stream into a string
pub fn dump_to_string(stream: &SerializedStream) -> Result<String> {
    let mut output = vec![];
    let mut writer = DumpWriter::new(&mut output);
    stream.dump(&mut writer)?;
    writer.close()?;
    Ok(String::from_utf8_lossy(&output).into_owned())
}

impl Dump for SerializedStream {
    fn dump<W: Write>(&self, out: &mut DumpWriter<W>) -> Result<()> {
        writeln!(out, "STREAM_VERSION {}", self.version)?;
        for content in &self.contents {
            content.dump(out)?;
            out.end_line()?;
        }
        Ok(())
    }
}

impl Dump for Content {
    fn dump<W: Write>(&self, out: &mut DumpWriter<W>) -> Result<()> {
        match self {
            Content::Null => write!(out, "TC_NULL"),
            Content::Reference(handle) => write!(out, "TC_REFERENCE {}", handle),
            Content::ClassDesc(desc) => desc.dump(out),
            Content::ProxyClassDesc(proxy) => proxy.dump(out),
            Content::Object(object) => object.dump(out),
            Content::String(string) => string.dump(out),
            Content::Array(array) => array.dump(out),
            Content::Enum(constant) => constant.dump(out),
            Content::Class(class) => {
                write!(out, "TC_CLASS {} ", class.handle)?;
                class.class_pointer.dump(out)
            }
            Content::BlockData(block) => {
                let tag = if block.long {
                    "TC_BLOCKDATALONG"
                } else {
                    "TC_BLOCKDATA"
                };
                write!(out, "{} [{}] 0x{}", tag, block.data.len(), hexify(&block.data))
            }
            Content::Reset => {
                out.reset();
                write!(out, "TC_RESET")
            }
            Content::Exception(exception) => {
                out.reset();
                write!(out, "TC_EXCEPTION ")?;
                exception.throwable.dump(out)?;
                out.reset();
                Ok(())
            }
        }
    }
}

impl Dump for ClassPointer {
    fn dump<W: Write>(&self, out: &mut DumpWriter<W>) -> Result<()> {
        match self {
            ClassPointer::Null => write!(out, "TC_NULL"),
            ClassPointer::Reference(handle) => match out.class_name(self) {
                Some(name) => write!(out, "TC_REFERENCE {} ({})", handle, name),
                None => write!(out, "TC_REFERENCE {}", handle),
            },
            ClassPointer::ClassDesc(desc) => desc.dump(out),
            ClassPointer::ProxyClassDesc(proxy) => proxy.dump(out),
        }
    }
}

fn dump_annotation<W: Write>(annotation: &[Content], out: &mut DumpWriter<W>) -> Result<()> {
    write!(out, "annotation")?;
    out.open_block()?;
    for content in annotation {
        content.dump(out)?;
        out.end_line()?;
    }
    out.close_block()
}

impl Dump for Arc<ClassDesc> {
    fn dump<W: Write>(&self, out: &mut DumpWriter<W>) -> Result<()> {
        out.classes
            .insert(self.handle, ClassPointer::ClassDesc(self.clone()));
        write!(out, "TC_CLASSDESC {} {}", self.handle, self.class_name)?;
        out.open_block()?;
        writeln!(out, "serialVersionUID {}", self.serial_version_uid)?;
        writeln!(
            out,
            "flags {:#04x} {}",
            self.raw_flags,
            self.flags().render()
        )?;
        write!(out, "fields")?;
        out.open_block()?;
        for field in &self.fields {
            write!(out, "{} {}", field.field_type, field.name)?;
            if let Some(class_name) = &field.class_name {
                write!(out, " ")?;
                class_name.dump(out)?;
            }
            out.end_line()?;
        }
        out.close_block()?;
        dump_annotation(&self.annotation, out)?;
        write!(out, "super ")?;
        self.super_class.dump(out)?;
        out.close_block()
    }
}

impl Dump for Arc<ProxyClassDesc> {
    fn dump<W: Write>(&self, out: &mut DumpWriter<W>) -> Result<()> {
        out.classes
            .insert(self.handle, ClassPointer::ProxyClassDesc(self.clone()));
        write!(out, "TC_PROXYCLASSDESC {}", self.handle)?;
        out.open_block()?;
        for interface in &self.interfaces {
            writeln!(out, "implements {}", interface)?;
        }
        dump_annotation(&self.annotation, out)?;
        write!(out, "super ")?;
        self.super_class.dump(out)?;
        out.close_block()
    }
}

impl Dump for StringRecord {
    fn dump<W: Write>(&self, out: &mut DumpWriter<W>) -> Result<()> {
        let tag = if self.long { "TC_LONGSTRING" } else { "TC_STRING" };
        write!(out, "{} {} {:?}", tag, self.handle, self.value)
    }
}

impl Dump for Object {
    fn dump<W: Write>(&self, out: &mut DumpWriter<W>) -> Result<()> {
        write!(out, "TC_OBJECT {}", self.handle)?;
        out.open_block()?;
        write!(out, "class ")?;
        self.class_pointer.dump(out)?;
        out.end_line()?;

        let classes = out.ancestors_first(&self.class_pointer);
        for (index, data) in self.class_data.iter().enumerate() {
            let class = classes.get(index);
            match class {
                Some(class) => write!(out, "data {}", class.class_name)?,
                None => write!(out, "data #{}", index)?,
            }
            out.open_block()?;
            for (field_index, value) in data.values.iter().enumerate() {
                match class.and_then(|class| class.fields.get(field_index)) {
                    Some(field) => write!(out, "{} = ", field.name)?,
                    None => write!(out, "#{} = ", field_index)?,
                }
                value.dump(out)?;
                out.end_line()?;
            }
            if let Some(annotation) = &data.annotation {
                dump_annotation(annotation, out)?;
            }
            out.close_block()?;
        }
        out.close_block()
    }
}

impl Dump for Array {
    fn dump<W: Write>(&self, out: &mut DumpWriter<W>) -> Result<()> {
        write!(out, "TC_ARRAY {}", self.handle)?;
        out.open_block()?;
        write!(out, "class ")?;
        self.class_pointer.dump(out)?;
        out.end_line()?;
        write!(out, "values [{}]", self.values.len())?;
        out.open_block()?;
        for value in &self.values {
            value.dump(out)?;
            out.end_line()?;
        }
        out.close_block()?;
        out.close_block()
    }
}

impl Dump for EnumConstant {
    fn dump<W: Write>(&self, out: &mut DumpWriter<W>) -> Result<()> {
        write!(out, "TC_ENUM {}", self.handle)?;
        out.open_block()?;
        write!(out, "class ")?;
        self.class_pointer.dump(out)?;
        out.end_line()?;
        write!(out, "constant ")?;
        self.constant_name.dump(out)?;
        out.close_block()
    }
}

impl Dump for FieldValue {
    fn dump<W: Write>(&self, out: &mut DumpWriter<W>) -> Result<()> {
        match self {
            FieldValue::Byte(value) => write!(out, "(byte) {}", value),
            FieldValue::Char(value) => match char::from_u32(*value as u32) {
                Some(c) if !c.is_control() => write!(out, "(char) {:?}", c),
                _ => write!(out, "(char) {:#06x}", value),
            },
            FieldValue::Double(value) => write!(out, "(double) {}", value),
            FieldValue::Float(value) => write!(out, "(float) {}", value),
            FieldValue::Int(value) => write!(out, "(int) {}", value),
            FieldValue::Long(value) => write!(out, "(long) {}", value),
            FieldValue::Short(value) => write!(out, "(short) {}", value),
            FieldValue::Boolean(0) => write!(out, "(boolean) false"),
            FieldValue::Boolean(1) => write!(out, "(boolean) true"),
            FieldValue::Boolean(other) => write!(out, "(boolean) true ({:#04x})", other),
            FieldValue::Object(content) => content.dump(out),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn indentation() -> Result<()> {
        let mut output = vec![];
        let mut writer = DumpWriter::new(&mut output);
        write!(writer, "outer")?;
        writer.open_block()?;
        writeln!(writer, "inner")?;
        writer.close_block()?;
        writer.close()?;
        assert_eq!(
            std::str::from_utf8(&output).unwrap(),
            "outer {\n  inner\n}\n"
        );
        Ok(())
    }

    #[test]
    fn hex() {
        assert_eq!(hexify(&[0x00, 0xAB, 0x7F]), "00ab7f");
        assert_eq!(hexify(&[]), "");
    }

    #[test]
    fn object_through_class_reference() {
        // Two instances of `class A { byte b; }`, the second referring back to the class
        let data = [
            0xAC, 0xED, 0x00, 0x05, // header
            0x73, 0x72, 0x00, 0x01, b'A', 0, 0, 0, 0, 0, 0, 0, 7, 0x02, 0x00, 0x01, b'B', 0x00,
            0x01, b'b', 0x78, 0x70, 0x05, // first object
            0x73, 0x71, 0x00, 0x7E, 0x00, 0x00, 0x06, // second object
        ];
        let stream = SerializedStream::decode(&data).unwrap();
        let dumped = dump_to_string(&stream).unwrap();
        let expected = "\
STREAM_VERSION 5
TC_OBJECT 0x7e0001 {
  class TC_CLASSDESC 0x7e0000 A {
    serialVersionUID 7
    flags 0x02 SC_SERIALIZABLE
    fields {
      byte b
    }
    annotation {
    }
    super TC_NULL
  }
  data A {
    b = (byte) 5
  }
}
TC_OBJECT 0x7e0002 {
  class TC_REFERENCE 0x7e0000 (A)
  data A {
    b = (byte) 6
  }
}
";
        assert_eq!(dumped, expected);
    }
}
