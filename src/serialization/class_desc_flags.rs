use bitflags::bitflags;

bitflags! {
    /// Flags on a class descriptor (`classDescFlags` in the [protocol grammar][0])
    ///
    /// The bits are independent: a class with a custom `writeObject` is written with
    /// `SERIALIZABLE | WRITE_METHOD`, an externalizable class with `EXTERNALIZABLE | BLOCK_DATA`.
    ///
    /// [0]: https://docs.oracle.com/en/java/javase/17/docs/specs/serialization/protocol.html#terminal-symbols-and-constants
    pub struct ClassDescFlags: u8 {
        const WRITE_METHOD = 0x01;
        const SERIALIZABLE = 0x02;
        const EXTERNALIZABLE = 0x04;
        const BLOCK_DATA = 0x08;
        const ENUM = 0x10;
    }
}

impl ClassDescFlags {
    /// Protocol names of the recognized bits that are set, joined with `|`
    pub fn render(&self) -> String {
        let names = [
            (ClassDescFlags::SERIALIZABLE, "SC_SERIALIZABLE"),
            (ClassDescFlags::WRITE_METHOD, "SC_WRITE_METHOD"),
            (ClassDescFlags::EXTERNALIZABLE, "SC_EXTERNALIZABLE"),
            (ClassDescFlags::BLOCK_DATA, "SC_BLOCK_DATA"),
            (ClassDescFlags::ENUM, "SC_ENUM"),
        ];
        names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Does a class with these flags write an annotation after its field values?
    pub fn has_object_annotation(&self) -> bool {
        self.contains(ClassDescFlags::SERIALIZABLE | ClassDescFlags::WRITE_METHOD)
            || self.contains(ClassDescFlags::EXTERNALIZABLE | ClassDescFlags::BLOCK_DATA)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn combined_flags() {
        let flags = ClassDescFlags::from_bits_truncate(0x03);
        assert_eq!(flags.render(), "SC_SERIALIZABLE|SC_WRITE_METHOD");
        assert!(flags.has_object_annotation());
    }

    #[test]
    fn unknown_bits_are_ignored_for_queries() {
        let flags = ClassDescFlags::from_bits_truncate(0x82);
        assert_eq!(flags, ClassDescFlags::SERIALIZABLE);
        assert!(!flags.has_object_annotation());
    }

    #[test]
    fn externalizable_needs_block_data_for_annotation() {
        assert!(!ClassDescFlags::EXTERNALIZABLE.has_object_annotation());
        assert!((ClassDescFlags::EXTERNALIZABLE | ClassDescFlags::BLOCK_DATA).has_object_annotation());
    }
}
