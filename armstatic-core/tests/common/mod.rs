//! Hand-assembled ELF32/ARM fixture builder shared by the integration tests.
//!
//! Builds a minimal but structurally valid little-endian ELF32 executable:
//! one PT_LOAD segment, a `.text` section holding caller-supplied code, one
//! global FUNC symbol named `name` pointing at `.text`, and the string/shstr
//! tables the symbol and section names need. Good enough for `goblin::elf`
//! to parse and for `Container`/`Binary` to walk end to end.

const EHDR_SIZE: u32 = 52;
const PHDR_SIZE: u32 = 32;
const SHDR_SIZE: u32 = 40;
const SYM_SIZE: u32 = 16;

pub fn build_minimal_elf32(vaddr: u32, code: &[u8], symbol_name: &str) -> Vec<u8> {
    let phdr_off = EHDR_SIZE;
    let text_off = phdr_off + PHDR_SIZE;
    let text_size = code.len() as u32;

    let symtab_off = text_off + text_size;
    // null symbol + one FUNC symbol
    let symtab_size = SYM_SIZE * 2;

    let mut strtab: Vec<u8> = vec![0];
    let name_off = strtab.len() as u32;
    strtab.extend_from_slice(symbol_name.as_bytes());
    strtab.push(0);
    let strtab_off = symtab_off + symtab_size;
    let strtab_size = strtab.len() as u32;

    // shstrtab: \0 .text \0 .symtab \0 .strtab \0 .shstrtab \0
    let mut shstrtab: Vec<u8> = vec![0];
    let text_name_off = shstrtab.len() as u32;
    shstrtab.extend_from_slice(b".text\0");
    let symtab_name_off = shstrtab.len() as u32;
    shstrtab.extend_from_slice(b".symtab\0");
    let strtab_name_off = shstrtab.len() as u32;
    shstrtab.extend_from_slice(b".strtab\0");
    let shstrtab_name_off = shstrtab.len() as u32;
    shstrtab.extend_from_slice(b".shstrtab\0");
    let shstrtab_off = strtab_off + strtab_size;
    let shstrtab_size = shstrtab.len() as u32;

    let shdr_off = shstrtab_off + shstrtab_size;

    let mut buf: Vec<u8> = Vec::new();

    // e_ident
    buf.extend_from_slice(&[0x7F, b'E', b'L', b'F']);
    buf.push(1); // EI_CLASS = ELFCLASS32
    buf.push(1); // EI_DATA = little endian
    buf.push(1); // EI_VERSION
    buf.push(0); // EI_OSABI
    buf.extend_from_slice(&[0u8; 8]); // EI_ABIVERSION + padding

    buf.extend_from_slice(&2u16.to_le_bytes()); // e_type = ET_EXEC
    buf.extend_from_slice(&40u16.to_le_bytes()); // e_machine = EM_ARM
    buf.extend_from_slice(&1u32.to_le_bytes()); // e_version
    buf.extend_from_slice(&vaddr.to_le_bytes()); // e_entry
    buf.extend_from_slice(&phdr_off.to_le_bytes()); // e_phoff
    buf.extend_from_slice(&shdr_off.to_le_bytes()); // e_shoff
    buf.extend_from_slice(&0u32.to_le_bytes()); // e_flags
    buf.extend_from_slice(&(EHDR_SIZE as u16).to_le_bytes()); // e_ehsize
    buf.extend_from_slice(&(PHDR_SIZE as u16).to_le_bytes()); // e_phentsize
    buf.extend_from_slice(&1u16.to_le_bytes()); // e_phnum
    buf.extend_from_slice(&(SHDR_SIZE as u16).to_le_bytes()); // e_shentsize
    buf.extend_from_slice(&5u16.to_le_bytes()); // e_shnum
    buf.extend_from_slice(&4u16.to_le_bytes()); // e_shstrndx
    assert_eq!(buf.len() as u32, EHDR_SIZE);

    // program header: PT_LOAD covering the .text range
    buf.extend_from_slice(&1u32.to_le_bytes()); // p_type = PT_LOAD
    buf.extend_from_slice(&text_off.to_le_bytes()); // p_offset
    buf.extend_from_slice(&vaddr.to_le_bytes()); // p_vaddr
    buf.extend_from_slice(&vaddr.to_le_bytes()); // p_paddr
    buf.extend_from_slice(&text_size.to_le_bytes()); // p_filesz
    buf.extend_from_slice(&text_size.to_le_bytes()); // p_memsz
    buf.extend_from_slice(&5u32.to_le_bytes()); // p_flags = R+X
    buf.extend_from_slice(&4u32.to_le_bytes()); // p_align
    assert_eq!(buf.len() as u32, text_off);

    buf.extend_from_slice(code);
    assert_eq!(buf.len() as u32, symtab_off);

    // null symbol
    buf.extend_from_slice(&[0u8; SYM_SIZE as usize]);
    // FUNC symbol, global binding, bound to .text (section index 1)
    buf.extend_from_slice(&name_off.to_le_bytes()); // st_name
    buf.extend_from_slice(&vaddr.to_le_bytes()); // st_value
    buf.extend_from_slice(&text_size.to_le_bytes()); // st_size
    buf.push((1 << 4) | 2); // st_info: GLOBAL | FUNC
    buf.push(0); // st_other
    buf.extend_from_slice(&1u16.to_le_bytes()); // st_shndx = .text
    assert_eq!(buf.len() as u32, strtab_off);

    buf.extend_from_slice(&strtab);
    assert_eq!(buf.len() as u32, shstrtab_off);

    buf.extend_from_slice(&shstrtab);
    assert_eq!(buf.len() as u32, shdr_off);

    // section 0: NULL
    buf.extend_from_slice(&[0u8; SHDR_SIZE as usize]);

    // section 1: .text
    buf.extend_from_slice(&text_name_off.to_le_bytes()); // sh_name
    buf.extend_from_slice(&1u32.to_le_bytes()); // sh_type = PROGBITS
    buf.extend_from_slice(&(0x2 | 0x4u32).to_le_bytes()); // sh_flags = ALLOC|EXECINSTR
    buf.extend_from_slice(&vaddr.to_le_bytes()); // sh_addr
    buf.extend_from_slice(&text_off.to_le_bytes()); // sh_offset
    buf.extend_from_slice(&text_size.to_le_bytes()); // sh_size
    buf.extend_from_slice(&0u32.to_le_bytes()); // sh_link
    buf.extend_from_slice(&0u32.to_le_bytes()); // sh_info
    buf.extend_from_slice(&4u32.to_le_bytes()); // sh_addralign
    buf.extend_from_slice(&0u32.to_le_bytes()); // sh_entsize

    // section 2: .symtab
    buf.extend_from_slice(&symtab_name_off.to_le_bytes());
    buf.extend_from_slice(&2u32.to_le_bytes()); // sh_type = SYMTAB
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&symtab_off.to_le_bytes());
    buf.extend_from_slice(&symtab_size.to_le_bytes());
    buf.extend_from_slice(&3u32.to_le_bytes()); // sh_link -> .strtab
    buf.extend_from_slice(&1u32.to_le_bytes()); // sh_info -> one local symbol (the null entry)
    buf.extend_from_slice(&4u32.to_le_bytes());
    buf.extend_from_slice(&SYM_SIZE.to_le_bytes());

    // section 3: .strtab
    buf.extend_from_slice(&strtab_name_off.to_le_bytes());
    buf.extend_from_slice(&3u32.to_le_bytes()); // sh_type = STRTAB
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&strtab_off.to_le_bytes());
    buf.extend_from_slice(&strtab_size.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());

    // section 4: .shstrtab
    buf.extend_from_slice(&shstrtab_name_off.to_le_bytes());
    buf.extend_from_slice(&3u32.to_le_bytes()); // sh_type = STRTAB
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&shstrtab_off.to_le_bytes());
    buf.extend_from_slice(&shstrtab_size.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());

    buf
}
